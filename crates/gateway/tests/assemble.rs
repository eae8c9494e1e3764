//! End-to-end assembly tests: schema directories in, routed gateways out.

use std::path::Path;

use {
    async_graphql::{
        Value,
        dynamic::{Field, FieldFuture, Object, Schema, TypeRef},
    },
    axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    },
    manifold_gateway::{AssembleError, CollisionPolicy, GatewayConfig, assemble, assemble_sources},
    manifold_schemas::{SchemaError, SchemaSource, StaticSource},
    tower::ServiceExt,
};

fn config_for(dir: &Path) -> GatewayConfig {
    GatewayConfig {
        schemas: dir.to_path_buf(),
        ..GatewayConfig::default()
    }
}

/// A schema whose `ping` field answers with a fixed reply, so tests can tell
/// which schema a route is bound to.
fn ping_schema(reply: &'static str) -> Schema {
    let query = Object::new("Query").field(Field::new(
        "ping",
        TypeRef::named_nn(TypeRef::STRING),
        move |_| FieldFuture::from_value(Some(Value::from(reply))),
    ));
    Schema::build("Query", None::<&str>, None::<&str>)
        .register(query)
        .finish()
        .unwrap()
}

async fn post_query(
    router: Router,
    mount: &str,
    query: &str,
) -> (StatusCode, serde_json::Value) {
    let body = serde_json::json!({ "query": query }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri(format!("/{mount}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn mounts_one_route_per_candidate() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Users.graphql"),
        "type Query { users: [String] }",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Posts.graphql"),
        "type Query { posts: [String] }",
    )
    .unwrap();

    let gateway = assemble(&config_for(dir.path())).await.unwrap();
    let mut mounts = gateway.mounts();
    mounts.sort_unstable();
    assert_eq!(mounts, ["posts", "users"]);

    let router = gateway.into_router();
    let (status, json) = post_query(router.clone(), "users", "{ users }").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["users"], serde_json::Value::Null);
    assert!(json["errors"].is_null());

    let (status, json) = post_query(router, "posts", "{ posts }").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["errors"].is_null());
}

#[tokio::test]
async fn requests_never_cross_between_mounted_schemas() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Users.graphql"),
        "type Query { users: [String] }",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Posts.graphql"),
        "type Query { posts: [String] }",
    )
    .unwrap();

    let router = assemble(&config_for(dir.path()))
        .await
        .unwrap()
        .into_router();

    // A field from one schema must not resolve against the other's endpoint.
    let (_, json) = post_query(router.clone(), "posts", "{ users }").await;
    assert!(!json["errors"].is_null());

    let (_, json) = post_query(router, "users", "{ posts }").await;
    assert!(!json["errors"].is_null());
}

#[tokio::test]
async fn requests_under_the_mount_prefix_reach_the_same_schema() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Users.graphql"),
        "type Query { users: [String] }",
    )
    .unwrap();

    let router = assemble(&config_for(dir.path()))
        .await
        .unwrap()
        .into_router();

    let (status, json) = post_query(router, "users/graphql", "{ users }").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["errors"].is_null());
}

#[tokio::test]
async fn empty_directory_assembles_an_empty_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = assemble(&config_for(dir.path())).await.unwrap();
    assert!(gateway.mounts().is_empty());
}

#[tokio::test]
async fn missing_directory_fails_with_directory_read() {
    let err = assemble(&config_for(Path::new("/definitely/not/here")))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AssembleError::Schema(SchemaError::DirectoryRead { .. })
    ));
}

#[tokio::test]
async fn one_failing_candidate_aborts_the_whole_assembly() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Users.graphql"),
        "type Query { users: [String] }",
    )
    .unwrap();
    std::fs::write(dir.path().join("Broken.graphql"), "type Query {").unwrap();

    let err = assemble(&config_for(dir.path())).await.unwrap_err();
    assert!(matches!(
        err,
        AssembleError::Schema(SchemaError::InvalidSdl { .. })
    ));
}

#[tokio::test]
async fn subdirectory_candidate_follows_the_load_failure_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let err = assemble(&config_for(dir.path())).await.unwrap_err();
    assert!(matches!(
        err,
        AssembleError::Schema(SchemaError::SourceRead { .. })
    ));
}

#[tokio::test]
async fn colliding_mounts_last_registration_wins_by_default() {
    let sources: Vec<Box<dyn SchemaSource>> = vec![
        Box::new(StaticSource::new("Foo.ts", ping_schema("first"))),
        Box::new(StaticSource::new("foo.js", ping_schema("second"))),
    ];

    let gateway = assemble_sources(&sources, &GatewayConfig::default())
        .await
        .unwrap();
    assert_eq!(gateway.mounts(), ["foo"]);

    let (_, json) = post_query(gateway.into_router(), "foo", "{ ping }").await;
    assert_eq!(json["data"]["ping"], "second");
}

#[tokio::test]
async fn colliding_mounts_keep_the_first_when_configured() {
    let sources: Vec<Box<dyn SchemaSource>> = vec![
        Box::new(StaticSource::new("Foo.ts", ping_schema("first"))),
        Box::new(StaticSource::new("foo.js", ping_schema("second"))),
    ];
    let config = GatewayConfig {
        on_collision: CollisionPolicy::FirstWins,
        ..GatewayConfig::default()
    };

    let gateway = assemble_sources(&sources, &config).await.unwrap();
    assert_eq!(gateway.mounts(), ["foo"]);

    let (_, json) = post_query(gateway.into_router(), "foo", "{ ping }").await;
    assert_eq!(json["data"]["ping"], "first");
}

#[tokio::test]
async fn colliding_mounts_reject_when_configured() {
    let sources: Vec<Box<dyn SchemaSource>> = vec![
        Box::new(StaticSource::new("Foo.ts", ping_schema("first"))),
        Box::new(StaticSource::new("foo.js", ping_schema("second"))),
    ];
    let config = GatewayConfig {
        on_collision: CollisionPolicy::Reject,
        ..GatewayConfig::default()
    };

    let err = assemble_sources(&sources, &config).await.unwrap_err();
    match err {
        AssembleError::MountCollision {
            mount,
            first,
            second,
        } => {
            assert_eq!(mount, "foo");
            assert_eq!(first, "Foo.ts");
            assert_eq!(second, "foo.js");
        },
        other => panic!("expected MountCollision, got {other:?}"),
    }
}

#[tokio::test]
async fn graphiql_console_serves_on_get_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Users.graphql"), "type Query { me: String }").unwrap();

    let config = GatewayConfig {
        graphiql: true,
        ..config_for(dir.path())
    };
    let router = assemble(&config).await.unwrap().into_router();

    let request = Request::builder()
        .method("GET")
        .uri("/users")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("GraphiQL"));
}

#[tokio::test]
async fn console_is_absent_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Users.graphql"), "type Query { me: String }").unwrap();

    let router = assemble(&config_for(dir.path()))
        .await
        .unwrap()
        .into_router();

    let request = Request::builder()
        .method("GET")
        .uri("/users")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
