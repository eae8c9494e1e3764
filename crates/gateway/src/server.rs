use std::net::SocketAddr;

use {
    async_graphql::{dynamic, http::GraphiQLSource},
    async_graphql_axum::GraphQL,
    axum::{
        Router,
        response::Html,
        routing::{get, post_service},
    },
    thiserror::Error,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{debug, info, warn},
};

use manifold_schemas::{SchemaError, SchemaSource, discover};

use crate::{
    config::GatewayConfig,
    mount::{CollisionPolicy, mount_name},
};

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors that abort gateway assembly. No partial gateway escapes a failed
/// run.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Two sources derived the same mount path under
    /// [`CollisionPolicy::Reject`].
    #[error("mount path '/{mount}' is claimed by both {first} and {second}")]
    MountCollision {
        mount: String,
        first: String,
        second: String,
    },
}

// ── Assembled gateway ────────────────────────────────────────────────────────

/// One mounted endpoint: a mount path bound to the schema that exclusively
/// serves it.
#[derive(Debug)]
pub struct Endpoint {
    pub mount: String,
    /// Base name of the source this endpoint was loaded from.
    pub source: String,
    schema: dynamic::Schema,
}

/// The assembled gateway: a registration table of mount paths and their
/// schemas, read-only once assembly completes.
#[derive(Debug)]
pub struct Gateway {
    endpoints: Vec<Endpoint>,
    graphiql: bool,
}

impl Gateway {
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Mount paths in registration order.
    pub fn mounts(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.mount.as_str()).collect()
    }

    /// Wire every endpoint into an axum router.
    ///
    /// POST anywhere under `/{mount}` executes GraphQL against that
    /// endpoint's own schema; GET serves the GraphiQL console when enabled.
    /// Execution-time errors are the engine's to shape; nothing here
    /// inspects them.
    pub fn into_router(self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let mut router = Router::new();
        for endpoint in self.endpoints {
            let prefix = format!("/{}", endpoint.mount);
            let subtree = format!("{}/{{*rest}}", prefix.trim_end_matches('/'));
            let service = GraphQL::new(endpoint.schema);
            let route = if self.graphiql {
                let console_endpoint = prefix.clone();
                get(move || async move {
                    Html(GraphiQLSource::build().endpoint(&console_endpoint).finish())
                })
                .post_service(service)
            } else {
                post_service(service)
            };
            router = router.route(&prefix, route.clone()).route(&subtree, route);
        }

        router.layer(cors).layer(TraceLayer::new_for_http())
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────────

/// Assemble a gateway from the configured schema directory.
///
/// Discovery, loading, naming, and binding run strictly in enumeration
/// order; the first error aborts the whole assembly.
pub async fn assemble(config: &GatewayConfig) -> Result<Gateway, AssembleError> {
    let sources = discover(&config.schemas).await?;
    let sources: Vec<Box<dyn SchemaSource>> = sources
        .into_iter()
        .map(|s| Box::new(s) as Box<dyn SchemaSource>)
        .collect();
    assemble_sources(&sources, config).await
}

/// Assemble a gateway from an explicit source list.
///
/// The composable step behind [`assemble`]: embedders and tests pass
/// in-memory sources here. Sources load one at a time, each fully awaited
/// before the next begins; registration order equals source order.
pub async fn assemble_sources(
    sources: &[Box<dyn SchemaSource>],
    config: &GatewayConfig,
) -> Result<Gateway, AssembleError> {
    let mut endpoints: Vec<Endpoint> = Vec::with_capacity(sources.len());

    for source in sources {
        let loaded = source.load().await?;
        let mount = mount_name(source.name());
        debug!(source = source.name(), mount = %mount, "loaded schema");

        let endpoint = Endpoint {
            mount: mount.clone(),
            source: source.name().to_string(),
            schema: loaded.into_inner(),
        };

        if let Some(existing) = endpoints.iter_mut().find(|e| e.mount == mount) {
            match config.on_collision {
                CollisionPolicy::Reject => {
                    return Err(AssembleError::MountCollision {
                        mount,
                        first: existing.source.clone(),
                        second: endpoint.source,
                    });
                },
                CollisionPolicy::FirstWins => {
                    warn!(
                        mount = %mount,
                        kept = %existing.source,
                        dropped = %endpoint.source,
                        "duplicate mount path; keeping the first registration"
                    );
                },
                CollisionPolicy::LastWins => {
                    warn!(
                        mount = %mount,
                        replaced = %existing.source,
                        kept = %endpoint.source,
                        "duplicate mount path; later registration wins"
                    );
                    *existing = endpoint;
                },
            }
        } else {
            endpoints.push(endpoint);
        }
    }

    Ok(Gateway {
        endpoints,
        graphiql: config.graphiql,
    })
}

// ── Serving ──────────────────────────────────────────────────────────────────

/// Assemble the gateway and serve it until process shutdown.
pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let gateway = assemble(&config).await?;

    let addr: SocketAddr = format!("{}:{}", config.bind, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Startup banner.
    let lines = [
        format!("manifold gateway v{}", env!("CARGO_PKG_VERSION")),
        format!("listening on {addr}"),
        format!(
            "{} schemas mounted from {}",
            gateway.endpoints().len(),
            config.schemas.display()
        ),
        format!("graphiql: {}", if config.graphiql { "on" } else { "off" }),
    ];
    let width = lines.iter().map(|l| l.len()).max().unwrap_or(0) + 4;
    info!("┌{}┐", "─".repeat(width));
    for line in &lines {
        info!("│  {:<w$}│", line, w = width - 2);
    }
    info!("└{}┘", "─".repeat(width));
    for endpoint in gateway.endpoints() {
        info!(mount = %endpoint.mount, source = %endpoint.source, "mounted");
    }

    axum::serve(listener, gateway.into_router()).await?;
    Ok(())
}
