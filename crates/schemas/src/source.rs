use std::path::{Path, PathBuf};

use {async_graphql::dynamic, async_trait::async_trait};

use crate::{compile::compile_sdl, error::SchemaError};

/// An executable schema produced by a [`SchemaSource`].
///
/// Built once during assembly and never mutated afterwards; the endpoint that
/// mounts it is its sole owner.
#[derive(Debug)]
pub struct LoadedSchema {
    schema: dynamic::Schema,
}

impl LoadedSchema {
    pub fn new(schema: dynamic::Schema) -> Self {
        Self { schema }
    }

    /// Execute one request against this schema.
    pub async fn execute(
        &self,
        request: impl Into<async_graphql::Request>,
    ) -> async_graphql::Response {
        self.schema.execute(request.into()).await
    }

    /// Render the schema back out as SDL.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    pub fn into_inner(self) -> dynamic::Schema {
        self.schema
    }
}

/// A loadable unit that yields exactly one schema.
///
/// The two shipped variants cover SDL documents on disk ([`FileSource`]) and
/// schemas built in process ([`StaticSource`]); tests use the latter as an
/// in-memory fake.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Base name of the source, used to derive its endpoint mount path.
    fn name(&self) -> &str;

    /// Resolve this source to a loaded schema.
    async fn load(&self) -> Result<LoadedSchema, SchemaError>;
}

/// A schema source backed by an SDL document on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    name: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SchemaSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<LoadedSchema, SchemaError> {
        let sdl = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SchemaError::SourceRead {
                path: self.path.clone(),
                source,
            })?;
        compile_sdl(&self.name, &sdl)
    }
}

/// A schema source holding an already-built schema.
pub struct StaticSource {
    name: String,
    schema: dynamic::Schema,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, schema: dynamic::Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

#[async_trait]
impl SchemaSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<LoadedSchema, SchemaError> {
        Ok(LoadedSchema::new(self.schema.clone()))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        async_graphql::{
            Value,
            dynamic::{Field, FieldFuture, Object, Schema, TypeRef},
        },
    };

    fn pong_schema() -> Schema {
        let query = Object::new("Query").field(Field::new(
            "ping",
            TypeRef::named_nn(TypeRef::STRING),
            |_| FieldFuture::from_value(Some(Value::from("pong"))),
        ));
        Schema::build("Query", None::<&str>, None::<&str>)
            .register(query)
            .finish()
            .unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_a_source_read_error() {
        let source = FileSource::new("/nowhere/Users.graphql");
        assert_eq!(source.name(), "Users.graphql");
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, SchemaError::SourceRead { .. }));
    }

    #[tokio::test]
    async fn file_source_loads_sdl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Users.graphql");
        std::fs::write(&path, "type Query { me: String }").unwrap();

        let loaded = FileSource::new(path).load().await.unwrap();
        let response = loaded.execute("{ __typename }").await;
        assert!(response.errors.is_empty());
    }

    #[tokio::test]
    async fn static_source_loads_the_given_schema() {
        let source = StaticSource::new("ping.rs", pong_schema());
        let loaded = source.load().await.unwrap();
        let response = loaded.execute("{ ping }").await;
        assert_eq!(
            response.data,
            async_graphql::value!({ "ping": "pong" })
        );
    }
}
