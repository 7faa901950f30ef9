mod bootstrap;
mod health;
mod http;
mod pipeline;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use parley_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "parley-server",
    about = "Parley inference-to-intent service",
    long_about = "Accepts free-text prompts, runs inference, extracts structured intents, \
and routes recognized scheduling intents to the calendar provider."
)]
struct Args {
    /// Bind address for the interpret endpoint (`host:port`). Takes
    /// precedence over PARLEY_SERVER_BIND_ADDR and the built-in default.
    #[arg(long)]
    bind: Option<String>,
}

fn init_logging(config: &AppConfig) {
    use parley_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    let args = Args::parse();

    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions {
        overrides: ConfigOverrides { bind_address: args.bind, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    })?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    let bind_host =
        app.config.server.bind_address.rsplit_once(':').map(|(host, _)| host).unwrap_or("0.0.0.0");
    health::spawn(bind_host, app.config.server.health_check_port, app.engine.clone()).await?;

    let state = http::AppState::new(
        app.pipeline.clone(),
        Duration::from_secs(app.config.server.request_timeout_secs),
    );
    let listener = tokio::net::TcpListener::bind(&app.config.server.bind_address).await?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %app.config.server.bind_address,
        "parley-server started"
    );

    axum::serve(listener, http::router(state)).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "parley-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
