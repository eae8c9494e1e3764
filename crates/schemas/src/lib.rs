//! Schema source discovery and loading.
//!
//! A schema source is anything that can be resolved to one executable GraphQL
//! schema: an SDL document on disk, or a schema built programmatically and
//! handed over in memory. Discovery enumerates a directory of candidate
//! sources; loading resolves each candidate, with distinct errors for
//! "cannot be read", "not valid SDL", and "parses but defines no schema".
//!
//! The gateway crate is responsible for naming and mounting loaded schemas.
//! This crate only knows how to find and load them.

pub mod compile;
pub mod discover;
pub mod error;
pub mod source;

pub use {
    compile::compile_sdl,
    discover::discover,
    error::SchemaError,
    source::{FileSource, LoadedSchema, SchemaSource, StaticSource},
};
