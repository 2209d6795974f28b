//! Entity table names and row counts
//!
//! Table and column names are fixed by `sql_scripts/create_tables.sql`.

use crate::Result;
use sqlx::SqlitePool;

use super::models::TableCounts;

pub const DIRECTORS_TABLE: &str = "Directors";
pub const GENRES_TABLE: &str = "Genres";
pub const MOVIES_TABLE: &str = "Movies";

/// Tables the schema script must create
pub const ENTITY_TABLES: [&str; 3] = [DIRECTORS_TABLE, GENRES_TABLE, MOVIES_TABLE];

/// Count rows in each entity table
pub async fn table_counts(pool: &SqlitePool) -> Result<TableCounts> {
    Ok(TableCounts {
        directors: count_rows(pool, DIRECTORS_TABLE).await?,
        genres: count_rows(pool, GENRES_TABLE).await?,
        movies: count_rows(pool, MOVIES_TABLE).await?,
    })
}

async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64> {
    let count = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// List entity tables missing from the store
pub async fn missing_entity_tables(pool: &SqlitePool) -> Result<Vec<&'static str>> {
    let present: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT name
        FROM sqlite_master
        WHERE type = 'table'
          AND name NOT LIKE 'sqlite_%'
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ENTITY_TABLES
        .iter()
        .copied()
        .filter(|table| !present.iter().any(|name| name == table))
        .collect())
}
