//! Load metadata
//!
//! One `load_info` row is written by each successful load. The browser reads
//! the latest row to report when and from what the store was built.

use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqliteConnection, SqlitePool};

/// Record of one completed load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadInfo {
    pub load_id: String,
    pub source_file: String,
    pub loaded_at: DateTime<Utc>,
    /// Data rows in the source file, including ones that were dropped
    pub source_rows: i64,
    pub movie_count: i64,
    pub dropped_rows: i64,
}

/// Create the load_info table
pub async fn create_load_info_table(conn: &mut SqliteConnection) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS load_info (
            load_id TEXT PRIMARY KEY,
            source_file TEXT NOT NULL,
            loaded_at TIMESTAMP NOT NULL,
            source_rows INTEGER NOT NULL,
            movie_count INTEGER NOT NULL,
            dropped_rows INTEGER NOT NULL
        )
        "#,
    )
    .execute(conn)
    .await?;

    Ok(())
}

/// Record a completed load
pub async fn record_load(conn: &mut SqliteConnection, info: &LoadInfo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO load_info (
            load_id, source_file, loaded_at, source_rows, movie_count, dropped_rows
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&info.load_id)
    .bind(&info.source_file)
    .bind(info.loaded_at)
    .bind(info.source_rows)
    .bind(info.movie_count)
    .bind(info.dropped_rows)
    .execute(conn)
    .await?;

    Ok(())
}

/// Most recent load, if the store has load metadata
pub async fn latest_load(pool: &SqlitePool) -> Result<Option<LoadInfo>> {
    let has_table: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'load_info'",
    )
    .fetch_one(pool)
    .await?;

    if has_table == 0 {
        return Ok(None);
    }

    let row = sqlx::query(
        r#"
        SELECT load_id, source_file, loaded_at, source_rows, movie_count, dropped_rows
        FROM load_info
        ORDER BY loaded_at DESC
        LIMIT 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| LoadInfo {
        load_id: row.get("load_id"),
        source_file: row.get("source_file"),
        loaded_at: row.get("loaded_at"),
        source_rows: row.get("source_rows"),
        movie_count: row.get("movie_count"),
        dropped_rows: row.get("dropped_rows"),
    }))
}
