//! Gateway configuration: an explicit, immutable value passed into assembly.
//!
//! No hidden globals: the binary builds one [`GatewayConfig`] from an
//! optional config file plus CLI flags and hands it to the assembler.

use std::path::{Path, PathBuf};

use {
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::mount::CollisionPolicy;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "manifold.toml",
    "manifold.yaml",
    "manifold.yml",
    "manifold.json",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Directory scanned for schema documents.
    pub schemas: PathBuf,
    /// Serve the GraphiQL console on GET for every endpoint.
    pub graphiql: bool,
    /// What to do when two sources derive the same mount path.
    pub on_collision: CollisionPolicy,
    /// Bind address for the serving layer.
    pub bind: String,
    /// Listen port for the serving layer.
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            schemas: PathBuf::from("schemas"),
            graphiql: false,
            on_collision: CollisionPolicy::default(),
            bind: "127.0.0.1".to_string(),
            port: 4000,
        }
    }
}

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<GatewayConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load `manifold.{toml,yaml,yml,json}` from the working
/// directory.
///
/// Returns `GatewayConfig::default()` when no config file exists or the file
/// fails to parse (logged).
pub fn discover_and_load() -> GatewayConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(config) => return config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    }
    GatewayConfig::default()
}

fn find_config_file() -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<GatewayConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Unresolvable or malformed placeholders are left as-is.
fn substitute_env(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                out.push_str("${");
                rest = after;
            },
        }
    }
    out.push_str(rest);
    out
}
