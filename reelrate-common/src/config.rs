//! Configuration loading and credential resolution
//!
//! Resolution order for the TOML file:
//! 1. Explicit path (command-line argument), which must exist
//! 2. `<config dir>/reelrate/config.toml` when present
//! 3. Compiled defaults
//!
//! Credentials resolve environment variable first, then TOML.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the TMDB API key
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable holding the OMDb API key
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "reelrate_ratings=info,tower_http=info".to_string(),
        }
    }
}

/// Inbound request rate limiting, applied per client IP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Length of the replenishment window in seconds
    pub window_secs: u64,
    /// Requests allowed per client within one window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
        }
    }
}

/// Full TOML configuration for the ratings service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP listen port
    pub port: u16,
    /// Directory served as static files
    pub static_dir: PathBuf,
    /// TMDB v3 API key (metadata lookup)
    pub tmdb_api_key: Option<String>,
    /// OMDb API key (structured ratings lookup)
    pub omdb_api_key: Option<String>,
    /// Lifetime of cached aggregate ratings
    pub cache_ttl_secs: u64,
    /// Timeout applied to every outbound HTTP request
    pub http_timeout_secs: u64,
    /// Upper bound on one source resolver's total run time
    pub resolver_timeout_secs: u64,
    /// Enable the web search tier of the Letterboxd resolver
    pub letterboxd_web_search: bool,
    /// Scrape the Rotten Tomatoes page when OMDb has no score
    pub rotten_tomatoes_page_fallback: bool,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: PathBuf::from("public"),
            tmdb_api_key: None,
            omdb_api_key: None,
            cache_ttl_secs: 3600,
            http_timeout_secs: 10,
            resolver_timeout_secs: 30,
            letterboxd_web_search: true,
            rotten_tomatoes_page_fallback: false,
            rate_limit: RateLimitConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Platform config file location (`~/.config/reelrate/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reelrate").join("config.toml"))
}

/// Parse TOML text into a configuration
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load configuration from an explicit path, the platform default, or defaults
///
/// An explicit path that does not exist is an error; a missing platform
/// default file silently falls back to compiled defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                info!("No config file found, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config = parse_toml_config(&content)?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve a credential from the environment, then TOML
///
/// Returns `None` when neither source holds a valid key. Callers decide
/// whether absence is fatal.
pub fn resolve_credential(env_var: &str, toml_value: Option<&str>, label: &str) -> Option<String> {
    let env_key = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_value.filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "{} API key found in environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(key) = env_key {
        info!("{} API key loaded from environment variable", label);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_key {
        info!("{} API key loaded from TOML config", label);
        return Some(key.trim().to_string());
    }

    warn!(
        "{} API key not configured (set {} or {} in config.toml)",
        label,
        env_var,
        env_var.to_lowercase()
    );
    None
}
