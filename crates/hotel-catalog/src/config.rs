//! Configuration for catalog scans
//!
//! Settings come from `~/.config/hotel-dedup/config.toml` (or the platform
//! equivalent) when present, otherwise from defaults. The API key can always
//! be supplied through `GTO_API_KEY`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default catalog endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.gto.ua/api/v3";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GTO_API_KEY";

/// Upper bound accepted for `rps`
pub const MAX_RPS: f64 = 100.0;

/// Catalog access and scan settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// API root, without trailing slash
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Language code passed as `lang` on every request
    pub lang: String,
    /// Requests per second through the shared rate limiter
    pub rps: f64,
    /// Page size for hotel listing
    pub per_page: u32,
    /// Attempts per request, including the first
    pub max_retries: u32,
    pub request_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            lang: "en".to_string(),
            rps: 5.0,
            per_page: 100,
            max_retries: 3,
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("lang", &self.lang)
            .field("rps", &self.rps)
            .field("per_page", &self.per_page)
            .field("max_retries", &self.max_retries)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl ScanConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Read a TOML file, apply the environment override and validate
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location if the file exists, else use defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::load(&path)
            }
            _ => {
                let mut config = Self::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// `<config dir>/hotel-dedup/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hotel-dedup").join("config.toml"))
    }

    /// Take the API key from `GTO_API_KEY` when it is set
    pub fn apply_env(&mut self) {
        self.override_api_key(std::env::var(API_KEY_ENV).ok());
    }

    /// Replace the API key with `key` unless it is missing or blank
    pub fn override_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rps > 0.0 && self.rps <= MAX_RPS) {
            return Err(ConfigError::OutOfRange(format!(
                "rps must be in (0, {}], got {}",
                MAX_RPS, self.rps
            )));
        }

        if self.per_page == 0 {
            return Err(ConfigError::OutOfRange(
                "per_page must be positive".to_string(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ConfigError::OutOfRange(
                "max_retries must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(ConfigError::OutOfRange(format!(
                "base_url is not a valid URL: {}",
                self.base_url
            )));
        }

        Ok(())
    }
}

/// Configuration loading or validation error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),
}
