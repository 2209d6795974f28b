//! Configuration loading and setting resolution
//!
//! Every setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default store location, relative to the working directory
pub const DEFAULT_DATABASE: &str = "MovieLibrary.db";
/// Default raw source file for the loader
pub const DEFAULT_SOURCE: &str = "imdb_top_1000.csv";
/// Default schema script for the loader
pub const DEFAULT_SCHEMA: &str = "sql_scripts/create_tables.sql";
/// Default listen address for the browser
pub const DEFAULT_BIND: &str = "127.0.0.1:5730";
/// Config file picked up from the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "movielib.toml";

pub const ENV_CONFIG: &str = "MOVIELIB_CONFIG";
pub const ENV_DATABASE: &str = "MOVIELIB_DATABASE";
pub const ENV_SOURCE: &str = "MOVIELIB_SOURCE";
pub const ENV_SCHEMA: &str = "MOVIELIB_SCHEMA";
pub const ENV_BIND: &str = "MOVIELIB_BIND";

/// Contents of `movielib.toml`
///
/// All keys are optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub bind: Option<String>,
}

impl TomlConfig {
    /// Parse config file contents
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load the config file
    ///
    /// An explicitly named file (argument, then `MOVIELIB_CONFIG`) must exist
    /// and parse. The implicit `movielib.toml` is optional: if it is absent,
    /// defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env_path = non_empty_env(ENV_CONFIG).map(PathBuf::from);

        if let Some(path) = explicit.map(Path::to_path_buf).or(env_path) {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
            })?;
            debug!("Loaded config file {}", path.display());
            return Self::from_toml_str(&content);
        }

        let implicit = Path::new(DEFAULT_CONFIG_FILE);
        if !implicit.exists() {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(implicit)?;
        debug!("Loaded config file {}", implicit.display());
        Self::from_toml_str(&content)
    }
}

/// Resolve a path setting: argument → environment → TOML → default
pub fn resolve_path(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_value: Option<&Path>,
    default: &str,
) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Some(path) = non_empty_env(env_var_name) {
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(path) = toml_value {
        return path.to_path_buf();
    }

    // Priority 4: Compiled default
    PathBuf::from(default)
}

/// Resolve a string setting with the same priority order as [`resolve_path`]
pub fn resolve_string(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
    default: &str,
) -> String {
    cli_arg
        .map(str::to_string)
        .or_else(|| non_empty_env(env_var_name))
        .or_else(|| toml_value.map(str::to_string))
        .unwrap_or_else(|| default.to_string())
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
