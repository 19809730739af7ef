//! Reconciler configuration.
//!
//! Defaults work against a local backend; every knob can be overridden from
//! an INI config file and again from the CLI (CLI > config file > default).
//!
//! ```ini
//! [backend]
//! url = http://127.0.0.1:8000
//!
//! [map]
//! poll_interval_secs = 2
//! refresh_interval_secs = 10
//! routing_profile = driving
//! advance_positions = true
//! ```

use std::path::Path;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

/// Default backend base URL (local routing service).
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Default live position poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default route geometry refresh interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

/// Default routing profile for geometry requests.
pub const DEFAULT_ROUTING_PROFILE: &str = "driving";

/// Errors loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// Configuration for the live map reconciler.
#[derive(Debug, Clone)]
pub struct MapConfig {
    /// Routing backend base URL.
    pub backend_url: String,

    /// Interval between live position polls.
    pub poll_interval: Duration,

    /// Interval between route geometry refresh cycles.
    pub refresh_interval: Duration,

    /// Routing profile forwarded to the geometry endpoint.
    pub routing_profile: String,

    /// Ask the server to step simulated vehicles on each poll.
    pub advance_positions: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            routing_profile: DEFAULT_ROUTING_PROFILE.to_string(),
            advance_positions: true,
        }
    }
}

impl MapConfig {
    /// Load configuration from an INI file, falling back to defaults for
    /// anything the file does not set.
    pub fn from_ini_file(path: &Path) -> Result<Self, ConfigError> {
        let file = Ini::load_from_file(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        let mut config = Self::default();

        if let Some(backend) = file.section(Some("backend")) {
            if let Some(url) = backend.get("url") {
                config.backend_url = url.trim_end_matches('/').to_string();
            }
        }

        if let Some(map) = file.section(Some("map")) {
            if let Some(raw) = map.get("poll_interval_secs") {
                config.poll_interval = Duration::from_secs(parse_secs("poll_interval_secs", raw)?);
            }
            if let Some(raw) = map.get("refresh_interval_secs") {
                config.refresh_interval =
                    Duration::from_secs(parse_secs("refresh_interval_secs", raw)?);
            }
            if let Some(profile) = map.get("routing_profile") {
                config.routing_profile = profile.to_string();
            }
            if let Some(raw) = map.get("advance_positions") {
                config.advance_positions = parse_bool("advance_positions", raw)?;
            }
        }

        Ok(config)
    }

    /// Override the backend URL.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the refresh interval.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
