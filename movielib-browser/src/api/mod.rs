//! HTTP API handlers for movielib-browser

pub mod health;
pub mod movies;
pub mod summary;
pub mod ui;

pub use health::health_routes;
pub use movies::{list_movies, search_movies};
pub use summary::get_summary;
pub use ui::{serve_app_js, serve_index};
