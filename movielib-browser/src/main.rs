//! movielib-browser - Read-only movie library browser
//!
//! Serves the library page and its JSON API over the store built by
//! movielib-loader. With no arguments it opens `MovieLibrary.db` in the
//! working directory and listens on 127.0.0.1:5730.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use movielib_browser::{build_router, AppState, BrowserSettings, MovieCatalog};
use movielib_common::config::TomlConfig;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for movielib-browser
#[derive(Parser, Debug)]
#[command(name = "movielib-browser")]
#[command(about = "Browse the movie library store")]
#[command(version)]
struct Args {
    /// Store file to read
    #[arg(long)]
    database: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// TOML config file (defaults to ./movielib.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    info!(
        "Starting movie library browser v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let toml = TomlConfig::load(args.config.as_deref())?;
    let settings = BrowserSettings::resolve(args.database.as_deref(), args.bind.as_deref(), &toml);

    info!("Database path: {}", settings.database.display());

    let catalog = match MovieCatalog::open(&settings.database).await {
        Ok(catalog) => {
            info!("✓ Connected to database (read-only)");
            catalog
        }
        Err(e) => {
            error!("Failed to open store: {}", e);
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(catalog));

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind))?;
    info!("movielib-browser listening on http://{}", settings.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
