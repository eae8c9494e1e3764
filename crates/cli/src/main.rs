use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use manifold_gateway::{GatewayConfig, config};

#[derive(Parser)]
#[command(name = "manifold", about = "Manifold — multi-schema GraphQL gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server.
    Serve {
        /// Directory to scan for schema documents.
        #[arg(long)]
        schemas: Option<PathBuf>,
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Enable the GraphiQL console on every endpoint.
        #[arg(long)]
        graphiql: bool,
    },
    /// Assemble the gateway without serving and print the mount table.
    Check {
        /// Directory to scan for schema documents.
        #[arg(long)]
        schemas: Option<PathBuf>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Config file first, CLI flags on top.
fn effective_config(
    schemas: Option<PathBuf>,
    bind: Option<String>,
    port: Option<u16>,
    graphiql: bool,
) -> GatewayConfig {
    let mut config = config::discover_and_load();
    if let Some(dir) = schemas {
        config.schemas = dir;
    }
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if graphiql {
        config.graphiql = true;
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "manifold starting");

    match cli.command {
        Commands::Serve {
            schemas,
            bind,
            port,
            graphiql,
        } => manifold_gateway::serve(effective_config(schemas, bind, port, graphiql)).await,
        Commands::Check { schemas } => {
            let config = effective_config(schemas, None, None, false);
            let gateway = manifold_gateway::assemble(&config).await?;
            println!(
                "{} schemas mounted from {}",
                gateway.endpoints().len(),
                config.schemas.display()
            );
            for endpoint in gateway.endpoints() {
                println!("  /{}  ({})", endpoint.mount, endpoint.source);
            }
            Ok(())
        },
    }
}
