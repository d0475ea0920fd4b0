//! Main application configuration
//!
//! This module defines the primary configuration structures for the ufc-elo
//! tool, including TOML file loading, environment variable loading and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub store: StoreSettings,
    pub rating: RatingConfig,
    pub fetch: FetchSettings,
    pub display: DisplaySettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Fight history file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path of the CSV fight history
    pub path: PathBuf,
    /// Fail the load on the first bad row instead of skipping it
    pub strict: bool,
}

/// Remote event source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Look for new events before rating
    pub enabled: bool,
    /// Page listing completed events
    pub events_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum retry attempts for a failed request
    pub max_retry_attempts: u32,
    /// Initial retry delay in milliseconds, doubled on each attempt
    pub retry_delay_ms: u64,
    /// Pause between consecutive event page requests in milliseconds
    pub request_delay_ms: u64,
    /// User agent sent with every request
    pub user_agent: String,
}

/// Ranking output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Number of fighters shown
    pub top: usize,
    /// Show peak, record, streak and schedule strength columns
    pub verbose: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("csv/UFC_db.csv"),
            strict: false,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            events_url: "http://ufcstats.com/statistics/events/completed".to_string(),
            timeout_seconds: 10,
            max_retry_attempts: 3,
            retry_delay_ms: 500,
            request_delay_ms: 250,
            user_agent: format!("ufc-elo/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            top: 15,
            verbose: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Store settings
        if let Ok(path) = env::var("UFC_ELO_HISTORY") {
            config.store.path = PathBuf::from(path);
        }
        if let Ok(strict) = env::var("UFC_ELO_STRICT") {
            config.store.strict = strict
                .parse()
                .map_err(|_| anyhow!("Invalid UFC_ELO_STRICT value: {}", strict))?;
        }

        // Rating settings
        if let Ok(rating) = env::var("STARTING_RATING") {
            config.rating.starting_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid STARTING_RATING value: {}", rating))?;
        }
        if let Ok(k) = env::var("K_FACTOR") {
            config.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid K_FACTOR value: {}", k))?;
        }
        if let Ok(window) = env::var("RECENT_WINDOW") {
            config.rating.recent_window = window
                .parse()
                .map_err(|_| anyhow!("Invalid RECENT_WINDOW value: {}", window))?;
        }

        // Fetch settings
        if let Ok(enabled) = env::var("FETCH_ENABLED") {
            config.fetch.enabled = enabled
                .parse()
                .map_err(|_| anyhow!("Invalid FETCH_ENABLED value: {}", enabled))?;
        }
        if let Ok(url) = env::var("FETCH_EVENTS_URL") {
            config.fetch.events_url = url;
        }
        if let Ok(timeout) = env::var("FETCH_TIMEOUT_SECONDS") {
            config.fetch.timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid FETCH_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(retries) = env::var("FETCH_MAX_RETRY_ATTEMPTS") {
            config.fetch.max_retry_attempts = retries
                .parse()
                .map_err(|_| anyhow!("Invalid FETCH_MAX_RETRY_ATTEMPTS value: {}", retries))?;
        }
        if let Ok(delay) = env::var("FETCH_RETRY_DELAY_MS") {
            config.fetch.retry_delay_ms = delay
                .parse()
                .map_err(|_| anyhow!("Invalid FETCH_RETRY_DELAY_MS value: {}", delay))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Get request timeout as Duration
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds)
    }

    /// Get initial retry delay as Duration
    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.retry_delay_ms)
    }

    /// Get pause between event requests as Duration
    pub fn fetch_request_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.request_delay_ms)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.store.path.as_os_str().is_empty() {
        return Err(anyhow!("History path cannot be empty"));
    }

    config.rating.validate()?;

    // Validate fetch settings
    if config.fetch.timeout_seconds == 0 {
        return Err(anyhow!("Fetch timeout must be greater than 0"));
    }
    if config.fetch.events_url.is_empty() {
        return Err(anyhow!("Events URL cannot be empty"));
    }

    Ok(())
}
