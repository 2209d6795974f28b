//! movielib-loader library - batch loader for the movie library store
//!
//! Rebuilds the store from scratch on every run:
//! 1. Pre-flight: read the schema script and the source CSV
//! 2. Coerce fields and drop rows that fail coercion
//! 3. Derive distinct directors and genres
//! 4. Build a staging store, resolve foreign keys, insert movies, validate
//! 5. Rename the staging store over the live store
//!
//! Any failure before step 5 leaves the live store exactly as it was.

use std::path::{Path, PathBuf};

use chrono::Utc;
use movielib_common::config::{
    resolve_path, TomlConfig, DEFAULT_DATABASE, DEFAULT_SCHEMA, DEFAULT_SOURCE, ENV_DATABASE,
    ENV_SCHEMA, ENV_SOURCE,
};
use movielib_common::db::LoadInfo;
use movielib_common::Result;
use tracing::{info, warn};
use uuid::Uuid;

pub mod cleaning;
pub mod normalize;
pub mod source;
pub mod store;

use cleaning::{clean_rows, DropCounts};
use normalize::derive_entities;

/// Resolved loader inputs and output
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSettings {
    pub source: PathBuf,
    pub database: PathBuf,
    pub schema: PathBuf,
}

impl LoaderSettings {
    /// Resolve each path from argument, environment, config file, default
    pub fn resolve(
        source: Option<&Path>,
        database: Option<&Path>,
        schema: Option<&Path>,
        toml: &TomlConfig,
    ) -> Self {
        Self {
            source: resolve_path(source, ENV_SOURCE, toml.source.as_deref(), DEFAULT_SOURCE),
            database: resolve_path(
                database,
                ENV_DATABASE,
                toml.database.as_deref(),
                DEFAULT_DATABASE,
            ),
            schema: resolve_path(schema, ENV_SCHEMA, toml.schema.as_deref(), DEFAULT_SCHEMA),
        }
    }
}

/// Outcome of a completed load
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub load_id: String,
    /// Data records in the source file
    pub source_rows: usize,
    pub unreadable_rows: usize,
    pub dropped: DropCounts,
    /// Rows whose director or genre did not resolve to an id
    pub unresolved_rows: usize,
    pub directors: usize,
    pub genres: usize,
    pub movies: usize,
}

impl LoadReport {
    /// Rows that did not become movies, for any reason
    pub fn rejected_rows(&self) -> usize {
        self.unreadable_rows + self.dropped.total() + self.unresolved_rows
    }
}

/// Rebuild the store described by `settings`
pub async fn run_load(settings: &LoaderSettings) -> Result<LoadReport> {
    info!("Source: {}", settings.source.display());
    info!("Schema: {}", settings.schema.display());
    info!("Database: {}", settings.database.display());

    // Pre-flight: nothing on disk changes until both inputs are in hand
    let schema_sql = store::read_schema(&settings.schema)?;
    let table = source::read_source(&settings.source)?;
    info!(
        "✓ Read {} records from {}",
        table.total_rows(),
        settings.source.display()
    );
    if table.unreadable_rows > 0 {
        warn!("Skipped {} unreadable records", table.unreadable_rows);
    }

    let (movies, dropped) = clean_rows(&table.rows);
    info!(
        "✓ Data types cleaned and validated: {} rows kept, {} dropped \
         (rating: {}, year: {}, director: {}, genre: {})",
        movies.len(),
        dropped.total(),
        dropped.missing_rating,
        dropped.missing_year,
        dropped.missing_director,
        dropped.missing_genre
    );

    let entities = derive_entities(&movies);

    if let Some(parent) = settings.database.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let staging = store::staging_path(&settings.database);
    store::remove_stale_staging(&staging)?;

    let load = LoadInfo {
        load_id: Uuid::new_v4().to_string(),
        source_file: settings.source.display().to_string(),
        loaded_at: Utc::now(),
        source_rows: table.total_rows() as i64,
        movie_count: 0,
        dropped_rows: (table.unreadable_rows + dropped.total()) as i64,
    };

    let staged = match stage_and_swap(&staging, settings, &schema_sql, &entities, &movies, &load)
        .await
    {
        Ok(staged) => staged,
        Err(e) => {
            if let Err(cleanup) = store::remove_stale_staging(&staging) {
                warn!("Failed to remove staging store: {}", cleanup);
            }
            return Err(e);
        }
    };
    info!("✓ Store replaced: {}", settings.database.display());

    if staged.unresolved_rows > 0 {
        warn!(
            "{} rows had unresolved director or genre references",
            staged.unresolved_rows
        );
    }

    Ok(LoadReport {
        load_id: load.load_id,
        source_rows: table.total_rows(),
        unreadable_rows: table.unreadable_rows,
        dropped,
        unresolved_rows: staged.unresolved_rows,
        directors: staged.directors,
        genres: staged.genres,
        movies: staged.movies,
    })
}

async fn stage_and_swap(
    staging: &Path,
    settings: &LoaderSettings,
    schema_sql: &str,
    entities: &normalize::EntitySets,
    movies: &[cleaning::CleanMovie],
    load: &LoadInfo,
) -> Result<store::StagedCounts> {
    let staged = store::build_staging_store(staging, schema_sql, entities, movies, load).await?;
    store::swap_into_place(staging, &settings.database)?;
    Ok(staged)
}
