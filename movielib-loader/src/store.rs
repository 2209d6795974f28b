//! Staging store build and atomic swap
//!
//! The new store is written to `<database>.loading` next to the live store,
//! validated, and then renamed over the live path. Readers either see the old
//! store or the complete new one, never a half-written file.

use std::path::{Path, PathBuf};

use movielib_common::db::{
    create_load_info_table, create_store, missing_entity_tables, record_load, Director, Genre,
    LoadInfo, NewMovie,
};
use movielib_common::{Error, Result};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::cleaning::CleanMovie;
use crate::normalize::{resolve_movies, EntitySets, KeyMaps};

/// Suffix appended to the store path for the staging file
pub const STAGING_SUFFIX: &str = ".loading";

/// What was written to the staging store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedCounts {
    pub directors: usize,
    pub genres: usize,
    pub movies: usize,
    pub unresolved_rows: usize,
}

/// Path of the staging file for a store
pub fn staging_path(database: &Path) -> PathBuf {
    let mut name = database.as_os_str().to_os_string();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// Read the schema script
pub fn read_schema(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(Error::NotFound(format!(
            "Schema script not found: {}",
            path.display()
        )));
    }

    let script = std::fs::read_to_string(path)?;
    if script.trim().is_empty() {
        return Err(Error::Config(format!(
            "Schema script is empty: {}",
            path.display()
        )));
    }

    Ok(script)
}

/// Remove a leftover staging file from an interrupted load
pub fn remove_stale_staging(staging: &Path) -> Result<()> {
    if staging.exists() {
        warn!("Removing stale staging store: {}", staging.display());
        std::fs::remove_file(staging)?;
    }
    Ok(())
}

/// Build a complete store at `staging`
///
/// The staging file must not exist. On error the caller is responsible for
/// removing whatever was written.
pub async fn build_staging_store(
    staging: &Path,
    schema_sql: &str,
    entities: &EntitySets,
    movies: &[CleanMovie],
    load: &LoadInfo,
) -> Result<StagedCounts> {
    let pool = create_store(staging).await?;
    let result = populate(&pool, schema_sql, entities, movies, load).await;
    pool.close().await;
    result
}

async fn populate(
    pool: &SqlitePool,
    schema_sql: &str,
    entities: &EntitySets,
    movies: &[CleanMovie],
    load: &LoadInfo,
) -> Result<StagedCounts> {
    sqlx::raw_sql(schema_sql)
        .execute(pool)
        .await
        .map_err(|e| Error::Config(format!("Schema script failed: {}", e)))?;

    let missing = missing_entity_tables(pool).await?;
    if !missing.is_empty() {
        return Err(Error::Config(format!(
            "Schema script did not create tables: {}",
            missing.join(", ")
        )));
    }
    info!("✓ Database and tables created");

    let mut tx = pool.begin().await?;

    insert_names(
        &mut tx,
        "INSERT INTO Directors (director_name) VALUES (?)",
        &entities.directors,
    )
    .await?;
    insert_names(
        &mut tx,
        "INSERT INTO Genres (genre_name) VALUES (?)",
        &entities.genres,
    )
    .await?;
    info!(
        "✓ Inserted {} unique directors and {} unique genres",
        entities.directors.len(),
        entities.genres.len()
    );

    let keys = load_key_maps(&mut tx).await?;
    let (resolved, unresolved_rows) = resolve_movies(movies, &keys);
    insert_movies(&mut tx, &resolved).await?;
    info!("✓ Inserted {} movies", resolved.len());

    let info = LoadInfo {
        movie_count: resolved.len() as i64,
        dropped_rows: load.dropped_rows + unresolved_rows as i64,
        ..load.clone()
    };
    create_load_info_table(&mut *tx).await?;
    record_load(&mut *tx, &info).await?;

    tx.commit().await?;

    validate(pool, resolved.len()).await?;
    info!("✓ Store validated");

    Ok(StagedCounts {
        directors: entities.directors.len(),
        genres: entities.genres.len(),
        movies: resolved.len(),
        unresolved_rows,
    })
}

async fn insert_names(
    tx: &mut Transaction<'_, Sqlite>,
    sql: &str,
    names: &[String],
) -> Result<()> {
    for name in names {
        sqlx::query(sql).bind(name).execute(&mut **tx).await?;
    }
    Ok(())
}

async fn load_key_maps(tx: &mut Transaction<'_, Sqlite>) -> Result<KeyMaps> {
    let directors = sqlx::query_as::<_, (i64, String)>(
        "SELECT director_id, director_name FROM Directors",
    )
    .fetch_all(&mut **tx)
    .await?
    .into_iter()
    .map(|(id, name)| Director { id, name })
    .collect();

    let genres = sqlx::query_as::<_, (i64, String)>("SELECT genre_id, genre_name FROM Genres")
        .fetch_all(&mut **tx)
        .await?
        .into_iter()
        .map(|(id, name)| Genre { id, name })
        .collect();

    Ok(KeyMaps::new(directors, genres))
}

async fn insert_movies(tx: &mut Transaction<'_, Sqlite>, movies: &[NewMovie]) -> Result<()> {
    for movie in movies {
        sqlx::query(
            r#"
            INSERT INTO Movies (title, release_year, imdb_rating, director_id, genre_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&movie.title)
        .bind(movie.release_year)
        .bind(movie.rating)
        .bind(movie.director_id)
        .bind(movie.genre_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

/// Check referential integrity and the movie count before the swap
async fn validate(pool: &SqlitePool, expected_movies: usize) -> Result<()> {
    let violations = sqlx::query("PRAGMA foreign_key_check")
        .fetch_all(pool)
        .await?;
    if !violations.is_empty() {
        return Err(Error::Internal(format!(
            "Staging store has {} foreign key violations",
            violations.len()
        )));
    }

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Movies")
        .fetch_one(pool)
        .await?;
    if stored != expected_movies as i64 {
        return Err(Error::Internal(format!(
            "Staging store has {} movies, expected {}",
            stored, expected_movies
        )));
    }

    Ok(())
}

/// Replace the live store with the staging store
pub fn swap_into_place(staging: &Path, database: &Path) -> Result<()> {
    if database.is_dir() {
        return Err(Error::Config(format!(
            "Store path is a directory: {}",
            database.display()
        )));
    }

    std::fs::rename(staging, database)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_path_is_sibling() {
        let staging = staging_path(Path::new("/data/MovieLibrary.db"));
        assert_eq!(staging, PathBuf::from("/data/MovieLibrary.db.loading"));
    }

    #[test]
    fn test_read_schema_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_schema(&dir.path().join("absent.sql"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_read_schema_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.sql");
        std::fs::write(&path, "\n  \n").unwrap();
        assert!(matches!(read_schema(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_swap_replaces_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let live = dir.path().join("store.db");
        let staging = staging_path(&live);
        std::fs::write(&live, b"old").unwrap();
        std::fs::write(&staging, b"new").unwrap();

        swap_into_place(&staging, &live).unwrap();

        assert_eq!(std::fs::read(&live).unwrap(), b"new");
        assert!(!staging.exists());
    }

    #[tokio::test]
    async fn test_bad_schema_script_fails() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("store.db.loading");
        let load = LoadInfo {
            load_id: "test".to_string(),
            source_file: "movies.csv".to_string(),
            loaded_at: chrono::Utc::now(),
            source_rows: 0,
            movie_count: 0,
            dropped_rows: 0,
        };

        let result = build_staging_store(
            &staging,
            "CREATE TABLE Directors (director_id INTEGER PRIMARY KEY);",
            &EntitySets::default(),
            &[],
            &load,
        )
        .await;

        assert!(matches!(result, Err(Error::Config(msg)) if msg.contains("Genres")));
    }
}
