//! Configuration loading from volttrack.toml and environment variables.
//!
//! The TOML file supplies defaults; environment variables (loaded from .env
//! by the binary via `dotenvy`) override individual fields. A missing file is
//! not an error - every field has a usable default so the app can start
//! against a locally configured backend with nothing but env vars set.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Backend project identifier, sent with every request
    #[serde(default)]
    pub project_id: String,
    /// Optional server API key for privileged database operations
    #[serde(default)]
    pub api_key: Option<String>,
    /// Path of the persisted session file
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
    /// Enables verbose diagnostics
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            project_id: String::new(),
            api_key: None,
            session_file: default_session_file(),
            debug: false,
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_session_file() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".volttrack_session.json")
}

/// Parses configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse volttrack.toml: {e}"),
    })
}

/// Loads the application configuration from ./volttrack.toml (if present)
/// and applies environment-variable overrides.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("volttrack.toml").exists() {
        load_config("volttrack.toml")?
    } else {
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    Ok(config)
}

/// Applies `VOLTTRACK_*` environment-variable overrides to a configuration.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(url) = std::env::var("VOLTTRACK_API_URL") {
        config.api_url = url;
    }
    if let Ok(project) = std::env::var("VOLTTRACK_PROJECT_ID") {
        config.project_id = project;
    }
    if let Ok(key) = std::env::var("VOLTTRACK_API_KEY") {
        config.api_key = Some(key);
    }
    if let Ok(path) = std::env::var("VOLTTRACK_SESSION_FILE") {
        config.session_file = PathBuf::from(path);
    }
    if let Ok(debug) = std::env::var("VOLTTRACK_DEBUG") {
        config.debug = debug == "1" || debug.eq_ignore_ascii_case("true");
    }
}
