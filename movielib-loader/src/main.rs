//! movielib-loader - Rebuild the movie library store from a CSV source
//!
//! Runs once to completion as an exclusive batch job. With no arguments it
//! reads `imdb_top_1000.csv` and `sql_scripts/create_tables.sql` from the
//! working directory and writes `MovieLibrary.db`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use movielib_common::config::TomlConfig;
use movielib_loader::{run_load, LoaderSettings};
use tracing::{error, info};

/// Command-line arguments for movielib-loader
#[derive(Parser, Debug)]
#[command(name = "movielib-loader")]
#[command(about = "Rebuild the movie library store from a CSV source")]
#[command(version)]
struct Args {
    /// Source CSV file
    #[arg(long)]
    source: Option<PathBuf>,

    /// Store file to replace
    #[arg(long)]
    database: Option<PathBuf>,

    /// Schema script executed against the new store
    #[arg(long)]
    schema: Option<PathBuf>,

    /// TOML config file (defaults to ./movielib.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(
        "Starting movie library loader v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let toml = TomlConfig::load(args.config.as_deref())?;
    let settings = LoaderSettings::resolve(
        args.source.as_deref(),
        args.database.as_deref(),
        args.schema.as_deref(),
        &toml,
    );

    let report = match run_load(&settings).await {
        Ok(report) => report,
        Err(e) => {
            error!("Load aborted: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "✓ Load {} complete: {} movies, {} directors, {} genres ({} of {} source rows rejected)",
        report.load_id,
        report.movies,
        report.directors,
        report.genres,
        report.rejected_rows(),
        report.source_rows
    );

    Ok(())
}
