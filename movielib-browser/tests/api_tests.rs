//! Integration tests for movielib-browser API endpoints
//!
//! Each test builds a real store with movielib-loader in a temp directory and
//! drives the router with `oneshot` requests.
//!
//! Tests cover:
//! - Health and page routes
//! - Full listing ordered by rating
//! - Title search: substring, case, literal wildcards, injection-shaped terms
//! - Memoization and reload-aware invalidation
//! - Store summary and missing-store handling

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use movielib_browser::{build_router, AppState, MovieCatalog};
use movielib_loader::{run_load, LoaderSettings};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const SCHEMA: &str = include_str!("../../sql_scripts/create_tables.sql");

const HEADER: &str = "Series_Title,Released_Year,IMDB_Rating,Director,Genre\n";

const LIBRARY: &str = "\
The Shawshank Redemption,1994,9.3,Frank Darabont,Drama
The Dark Knight,2008,9.0,Christopher Nolan,\"Action, Crime, Drama\"
Inception,2010,8.8,Christopher Nolan,\"Action, Adventure, Sci-Fi\"
The Dark Knight Rises,2012,8.4,Christopher Nolan,\"Action, Adventure\"
Knight and Day,2010,6.3,James Mangold,\"Action, Comedy\"
100% Wolf,2020,5.7,Alexs Stadermann,Animation
Apollo 13,PG-13,7.6,Ron Howard,\"Adventure, Drama\"
Memento,2000,8.4,Christopher Nolan,\"Mystery, Thriller\"
";

/// Test helper: store built from `rows` plus an app over it
struct TestStore {
    _dir: TempDir,
    settings: LoaderSettings,
    state: AppState,
    app: Router,
}

impl TestStore {
    async fn new(rows: &str) -> Self {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let schema = dir.path().join("create_tables.sql");
        let source = dir.path().join("movies.csv");
        std::fs::write(&schema, SCHEMA).unwrap();
        std::fs::write(&source, format!("{}{}", HEADER, rows)).unwrap();

        let settings = LoaderSettings {
            source,
            database: dir.path().join("MovieLibrary.db"),
            schema,
        };
        run_load(&settings).await.expect("Should build test store");

        let catalog = MovieCatalog::open(&settings.database)
            .await
            .expect("Should open test store");
        let state = AppState::new(catalog);
        let app = build_router(state.clone());

        Self {
            _dir: dir,
            settings,
            state,
            app,
        }
    }

    async fn reload(&self, rows: &str) {
        std::fs::write(&self.settings.source, format!("{}{}", HEADER, rows)).unwrap();
        run_load(&self.settings).await.expect("Should reload test store");
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, extract_json(response.into_body()).await)
    }

    async fn search_titles(&self, term: &str) -> Vec<String> {
        let (status, body) = self
            .get(&format!("/api/movies/search?q={}", encode(term)))
            .await;
        assert_eq!(status, StatusCode::OK, "search for {:?}: {}", term, body);
        titles(&body)
    }
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn titles(body: &Value) -> Vec<String> {
    body["rows"]
        .as_array()
        .expect("rows array")
        .iter()
        .map(|row| row["title"].as_str().unwrap().to_string())
        .collect()
}

/// Percent-encode a query value
fn encode(term: &str) -> String {
    term.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

// =============================================================================
// Health and page
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let store = TestStore::new(LIBRARY).await;

    let (status, body) = store.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "movielib-browser");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_index_page_served() {
    let store = TestStore::new(LIBRARY).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = store.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Movie Library Explorer"));
    assert!(html.contains("search-term"));
}

// =============================================================================
// Full listing
// =============================================================================

#[tokio::test]
async fn test_list_all_sorted_by_rating_desc() {
    let store = TestStore::new(LIBRARY).await;

    let (status, body) = store.get("/api/movies").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 7, "Apollo 13 is dropped at load");

    let ratings: Vec<f64> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["rating"].as_f64().unwrap())
        .collect();
    for pair in ratings.windows(2) {
        assert!(pair[0] >= pair[1], "Not sorted descending: {:?}", ratings);
    }
}

#[tokio::test]
async fn test_list_all_ties_keep_storage_order() {
    let store = TestStore::new(LIBRARY).await;

    let (_, body) = store.get("/api/movies").await;
    let listed = titles(&body);

    // Both rated 8.4; The Dark Knight Rises precedes Memento in the source
    let rises = listed.iter().position(|t| t == "The Dark Knight Rises").unwrap();
    let memento = listed.iter().position(|t| t == "Memento").unwrap();
    assert_eq!(memento, rises + 1);
}

#[tokio::test]
async fn test_list_all_denormalized_names() {
    let store = TestStore::new(LIBRARY).await;

    let (_, body) = store.get("/api/movies").await;
    let first = &body["rows"][0];

    assert_eq!(first["title"], "The Shawshank Redemption");
    assert_eq!(first["year"], 1994);
    assert_eq!(first["director"], "Frank Darabont");
    assert_eq!(first["genre"], "Drama");
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_substring() {
    let store = TestStore::new(LIBRARY).await;

    let found = store.search_titles("Knight").await;

    assert_eq!(
        found,
        vec!["The Dark Knight", "The Dark Knight Rises", "Knight and Day"]
    );
}

#[tokio::test]
async fn test_search_is_ascii_case_insensitive() {
    let store = TestStore::new(LIBRARY).await;

    let lower = store.search_titles("knight").await;
    let title = store.search_titles("Knight").await;
    let upper = store.search_titles("KNIGHT").await;

    assert_eq!(lower.len(), 3);
    assert_eq!(lower, title);
    assert_eq!(lower, upper);
}

#[tokio::test]
async fn test_search_no_match_is_empty_not_error() {
    let store = TestStore::new(LIBRARY).await;

    let (status, body) = store.get("/api/movies/search?q=Casablanca").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 0);
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_does_not_match_director_names() {
    let store = TestStore::new(LIBRARY).await;

    assert!(store.search_titles("Nolan").await.is_empty());
}

#[tokio::test]
async fn test_search_wildcards_are_literal() {
    let store = TestStore::new(LIBRARY).await;

    assert_eq!(store.search_titles("100%").await, vec!["100% Wolf"]);
    assert!(store.search_titles("%%").await.is_empty());
    assert!(store.search_titles("_").await.is_empty());
}

#[tokio::test]
async fn test_search_injection_shaped_term() {
    let store = TestStore::new(LIBRARY).await;

    assert!(store.search_titles("' OR 1=1 --").await.is_empty());
    assert!(store
        .search_titles("x'; DROP TABLE Movies; --")
        .await
        .is_empty());

    let (status, body) = store.get("/api/movies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 7);
}

#[tokio::test]
async fn test_search_empty_term_rejected() {
    let store = TestStore::new(LIBRARY).await;

    let (status, body) = store.get("/api/movies/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = store.get("/api/movies/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Memoization and reload
// =============================================================================

#[tokio::test]
async fn test_repeated_queries_served_from_cache() {
    let store = TestStore::new(LIBRARY).await;
    let catalog = Arc::clone(&store.state.catalog);

    let first = catalog.search("Knight").await.unwrap();
    let second = catalog.search("Knight").await.unwrap();

    assert_eq!(first.store_version, second.store_version);
    assert!(Arc::ptr_eq(&first.rows, &second.rows));

    let other = catalog.search("knight").await.unwrap();
    assert!(!Arc::ptr_eq(&first.rows, &other.rows), "Cache keyed by exact term");
    assert_eq!(*first.rows, *other.rows);
}

#[tokio::test]
async fn test_reload_invalidates_cache() {
    let store = TestStore::new(LIBRARY).await;

    let (_, before) = store.get("/api/movies/search?q=Knight").await;
    assert_eq!(before["total_results"], 3);
    let version_before = before["store_version"].as_u64().unwrap();

    store
        .reload("A Knight's Tale,2001,6.9,Brian Helgeland,\"Action, Adventure\"\n")
        .await;

    let (_, after) = store.get("/api/movies/search?q=Knight").await;
    assert_eq!(titles(&after), vec!["A Knight's Tale"]);
    assert!(after["store_version"].as_u64().unwrap() > version_before);

    let (_, listing) = store.get("/api/movies").await;
    assert_eq!(listing["total_results"], 1);
}

#[tokio::test]
async fn test_store_version_stable_without_reload() {
    let store = TestStore::new(LIBRARY).await;
    let catalog = &store.state.catalog;

    let v1 = catalog.store_version().await.unwrap();
    catalog.list_all().await.unwrap();
    let v2 = catalog.store_version().await.unwrap();

    assert_eq!(v1, v2);
}

// =============================================================================
// Summary and store availability
// =============================================================================

#[tokio::test]
async fn test_summary_reports_counts_and_load() {
    let store = TestStore::new(LIBRARY).await;

    let (status, body) = store.get("/api/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["counts"]["movies"], 7);
    assert_eq!(body["counts"]["directors"], 4);
    assert_eq!(body["counts"]["genres"], 4);
    assert_eq!(body["last_load"]["source_rows"], 8);
    assert_eq!(body["last_load"]["dropped_rows"], 1);
}

#[tokio::test]
async fn test_missing_store_reports_unavailable() {
    let store = TestStore::new(LIBRARY).await;
    std::fs::remove_file(&store.settings.database).unwrap();

    let (status, body) = store.get("/api/movies").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "STORE_UNAVAILABLE");
}
