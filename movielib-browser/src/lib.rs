//! movielib-browser library - read-only movie library browser
//!
//! Serves a single page with a title search and the full library listing,
//! backed by the store the loader produces. Never writes to the store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use movielib_common::config::{
    resolve_path, resolve_string, TomlConfig, DEFAULT_BIND, DEFAULT_DATABASE, ENV_BIND,
    ENV_DATABASE,
};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod error;

pub use catalog::MovieCatalog;

/// Resolved browser settings
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSettings {
    pub database: PathBuf,
    pub bind: String,
}

impl BrowserSettings {
    /// Resolve each setting from argument, environment, config file, default
    pub fn resolve(database: Option<&Path>, bind: Option<&str>, toml: &TomlConfig) -> Self {
        Self {
            database: resolve_path(
                database,
                ENV_DATABASE,
                toml.database.as_deref(),
                DEFAULT_DATABASE,
            ),
            bind: resolve_string(bind, ENV_BIND, toml.bind.as_deref(), DEFAULT_BIND),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<MovieCatalog>,
}

impl AppState {
    pub fn new(catalog: MovieCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/movies", get(api::list_movies))
        .route("/api/movies/search", get(api::search_movies))
        .route("/api/summary", get(api::get_summary));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
