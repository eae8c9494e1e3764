//! Gateway assembly: one HTTP server fronting many independently authored
//! GraphQL schemas.
//!
//! The pipeline is discover → load → name → bind, strictly in enumeration
//! order and all-or-nothing: the first failing candidate aborts assembly and
//! no endpoints are exposed. The assembled [`server::Gateway`] converts into
//! an `axum::Router`; port binding lives in [`server::serve`].

pub mod config;
pub mod mount;
pub mod server;

pub use {
    config::GatewayConfig,
    mount::{CollisionPolicy, mount_name},
    server::{AssembleError, Gateway, assemble, assemble_sources, serve},
};
