//! OKR Board Server
//!
//! Run with: cargo run -- --config config.toml
//!
//! # Configuration
//!
//! Settings come from the config file (see `--print-config`), then these
//! environment variables:
//! - `OKR_SUPABASE_URL` / `SUPABASE_URL`: Hosted store endpoint
//! - `OKR_SUPABASE_ANON_KEY` / `SUPABASE_ANON_KEY`: Access key
//! - `OKR_HOST`, `OKR_PORT`: Bind address (default: 127.0.0.1:8090)
//! - `OKR_REFRESH`: `full_reload` or `incremental`
//! - `OKR_LOG_LEVEL`, `OKR_LOG_FORMAT`: Logging (`RUST_LOG` wins when set)

use anyhow::Context;
use clap::Parser;
use okr_board::api::{serve, AppState};
use okr_board::config::{generate_default_config, Config, LoggingConfig};
use okr_board::remote::{DataStore, RestClient};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "okr-board")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Objectives and Key Results on a single page")]
struct Cli {
    /// Config file (default: user config dir, /etc/okr-board, ./config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Print a default config file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", generate_default_config());
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting OKR board v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Refresh after write: {}", config.view.refresh);

    let store = Arc::new(
        RestClient::new(config.remote.clone()).context("building remote store client")?,
    );
    if store.is_configured() {
        tracing::info!("Remote store: {}", config.remote.url);
    }

    let state = AppState::new(store, config.view.refresh, config.server.clone());
    serve(state, &config.server).await?;

    tracing::info!("OKR board stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("okr_board={},tower_http=info", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
