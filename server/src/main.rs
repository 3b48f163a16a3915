//! cidgen activation gateway
//!
//! Serves the confirmation id API in front of the BatchActivation service.
//!
//! Usage:
//!   cidgen-server --port 5000 --config cidgen.toml
//!
//! Request records are held in memory and lost on restart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use cidgen_activation::{ActivationConfig, Activator};
use cidgen_server::{build_router, AppState};
use cidgen_store::MemoryRecordStore;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cidgen-server")]
#[command(about = "Confirmation id activation gateway")]
struct Args {
    /// HTTP port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Path to a TOML activation config (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip TLS certificate validation for the activation service
    #[arg(long)]
    accept_invalid_certs: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<ActivationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading activation config from {:?}", path);
            ActivationConfig::load(path).context("Failed to load activation config")?
        }
        None => ActivationConfig::default(),
    };

    if args.accept_invalid_certs {
        warn!("--accept-invalid-certs set: remote TLS certificates will not be verified");
        config.accept_invalid_certs = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("cidgen server starting...");
    let config = load_config(&args)?;
    let activator = Activator::from_config(&config).context("Invalid activation config")?;
    info!(
        "Activation endpoint {} ({} products, {} fallback entries, timeout {}s)",
        config.endpoint,
        config.products.len(),
        activator.fallback().len(),
        config.timeout_secs
    );

    let state = AppState::new(activator, MemoryRecordStore::new());
    let app = build_router(state);

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
