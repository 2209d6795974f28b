//! # Movie Library Common
//!
//! Shared code for the loader and the browser:
//! - Store contract (table names, load metadata, connection helpers)
//! - Entity and view models
//! - Configuration resolution
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
