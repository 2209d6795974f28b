//! Store connections
//!
//! The browser only ever opens the store read-only. The loader opens a fresh
//! staging file read-write and never touches the live store directly.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;

/// Connect to an existing store in read-only mode
///
/// The single connection is kept open for the life of the pool so it stays
/// pinned to the file that existed when the pool was opened, even after the
/// loader renames a new store over the path.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {}\nRun movielib-loader first to build the store.",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a new, empty store file for writing
///
/// Uses a rollback journal rather than WAL so the finished store is a single
/// self-contained file that can be renamed into place.
pub async fn create_store(db_path: &Path) -> Result<SqlitePool> {
    if db_path.exists() {
        return Err(Error::Internal(format!(
            "Refusing to create store over existing file: {}",
            db_path.display()
        )));
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Delete);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
