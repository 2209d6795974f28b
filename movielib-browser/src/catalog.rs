//! Read-only movie catalog over the persisted store
//!
//! One `MovieCatalog` is constructed per process. It memoizes query results
//! per store version: before every query the store file's fingerprint is
//! re-read, and a changed fingerprint (the loader swapped in a new store)
//! reopens the pool, bumps the version and empties the cache.
//!
//! The cache holds at most [`MAX_CACHED_QUERIES`] results; the least recently
//! used one is evicted first.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use movielib_common::db::{
    connect_readonly, latest_load, table_counts, LoadInfo, MovieRow, StoreFingerprint,
    TableCounts,
};
use lru::LruCache;
use movielib_common::{Error, Result};
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Distinct queries whose results are memoized at once
pub const MAX_CACHED_QUERIES: usize = 256;

const MOVIE_SELECT: &str = r#"
    SELECT
        m.title AS title,
        m.release_year AS year,
        m.imdb_rating AS rating,
        d.director_name AS director,
        g.genre_name AS genre
    FROM Movies m
    JOIN Directors d ON m.director_id = d.director_id
    JOIN Genres g ON m.genre_id = g.genre_id
"#;

/// The two read patterns the browser exposes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogQuery {
    /// Every movie, highest rating first
    ListAll,
    /// Movies whose title contains the term
    Search(String),
}

/// Rows returned for a query, tagged with the store version they came from
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub store_version: u64,
    pub rows: Arc<Vec<MovieRow>>,
}

/// Store-level facts for the summary endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub store_version: u64,
    pub counts: TableCounts,
    pub last_load: Option<LoadInfo>,
}

struct CatalogState {
    pool: Option<SqlitePool>,
    fingerprint: Option<StoreFingerprint>,
    version: u64,
    cache: LruCache<CatalogQuery, Arc<Vec<MovieRow>>>,
}

/// Store access object shared by all request handlers
pub struct MovieCatalog {
    db_path: PathBuf,
    state: Mutex<CatalogState>,
}

impl MovieCatalog {
    /// Open the catalog; fails if the store does not exist
    pub async fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let catalog = Self {
            db_path: db_path.into(),
            state: Mutex::new(CatalogState {
                pool: None,
                fingerprint: None,
                version: 0,
                cache: LruCache::new(
                    NonZeroUsize::new(MAX_CACHED_QUERIES).unwrap_or(NonZeroUsize::MIN),
                ),
            }),
        };

        {
            let mut state = catalog.state.lock().await;
            refresh(&mut state, &catalog.db_path).await?;
        }

        Ok(catalog)
    }

    /// Current store version, after checking for a reload
    pub async fn store_version(&self) -> Result<u64> {
        let mut state = self.state.lock().await;
        refresh(&mut state, &self.db_path).await?;
        Ok(state.version)
    }

    /// All movies ordered by rating, highest first
    pub async fn list_all(&self) -> Result<QueryResult> {
        self.run(CatalogQuery::ListAll).await
    }

    /// Movies whose title contains `term`
    ///
    /// The term is matched literally (SQL wildcards in it have no special
    /// meaning) and case-insensitively for ASCII letters.
    pub async fn search(&self, term: &str) -> Result<QueryResult> {
        if term.trim().is_empty() {
            return Err(Error::InvalidInput("Empty search term".to_string()));
        }
        self.run(CatalogQuery::Search(term.to_string())).await
    }

    /// Row counts and latest load metadata
    pub async fn summary(&self) -> Result<StoreSummary> {
        let mut state = self.state.lock().await;
        let pool = refresh(&mut state, &self.db_path).await?;

        Ok(StoreSummary {
            store_version: state.version,
            counts: table_counts(&pool).await?,
            last_load: latest_load(&pool).await?,
        })
    }

    async fn run(&self, query: CatalogQuery) -> Result<QueryResult> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let pool = refresh(state, &self.db_path).await?;
        let version = state.version;

        if let Some(rows) = state.cache.get(&query) {
            debug!("Cache hit for {:?} (store version {})", query, version);
            return Ok(QueryResult {
                store_version: version,
                rows: Arc::clone(rows),
            });
        }

        let rows = Arc::new(execute(&pool, &query).await?);
        state.cache.put(query, Arc::clone(&rows));

        Ok(QueryResult {
            store_version: version,
            rows,
        })
    }
}

/// Reopen the pool if the store file changed; returns the current pool
async fn refresh(state: &mut CatalogState, db_path: &Path) -> Result<SqlitePool> {
    let current = StoreFingerprint::read(db_path)?;

    if let (Some(pool), Some(known)) = (&state.pool, state.fingerprint) {
        if known == current {
            return Ok(pool.clone());
        }
    }

    let pool = connect_readonly(db_path).await?;
    if let Some(old) = state.pool.replace(pool.clone()) {
        old.close().await;
    }
    state.fingerprint = Some(current);
    state.version += 1;
    state.cache.clear();

    info!(
        "Opened store {} (store version {})",
        db_path.display(),
        state.version
    );

    Ok(pool)
}

async fn execute(pool: &SqlitePool, query: &CatalogQuery) -> Result<Vec<MovieRow>> {
    let rows = match query {
        CatalogQuery::ListAll => {
            let sql = format!("{MOVIE_SELECT} ORDER BY m.imdb_rating DESC, m.movie_id ASC");
            sqlx::query(&sql).fetch_all(pool).await?
        }
        CatalogQuery::Search(term) => {
            let sql = format!("{MOVIE_SELECT} WHERE m.title LIKE ? ESCAPE '\\' ORDER BY m.movie_id ASC");
            sqlx::query(&sql)
                .bind(like_pattern(term))
                .fetch_all(pool)
                .await?
        }
    };

    Ok(rows
        .iter()
        .map(|row| MovieRow {
            title: row.get("title"),
            year: row.get("year"),
            rating: row.get("rating"),
            director: row.get("director"),
            genre: row.get("genre"),
        })
        .collect())
}

/// Wrap a search term as a literal-substring LIKE pattern
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
