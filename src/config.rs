//! TOML-based application configuration.

use std::fs;
use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::site::SiteConfig;

/// Top-level configuration parsed from TOML.
///
/// Every section has defaults, so an empty file (or no file at all, via
/// [`AppConfig::default`]) yields a runnable Mumbai demo site.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Engine timing, retention and randomness.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Initial site parameters (mutable at runtime through the API).
    #[serde(default)]
    pub site: SiteConfig,
    /// Upstream weather lookup.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Static login credentials.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Log output format.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Longest history backfill accepted, in days.
pub const MAX_SEED_DAYS: u32 = 366;

/// Engine timing, retention and randomness.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Master random seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    /// Hours of battery integration applied per live tick.
    pub live_tick_hours: f64,
    /// Hours of battery integration applied per seeded history sample.
    pub backfill_hours: f64,
    /// Days of hourly history generated on an empty store, at most
    /// [`MAX_SEED_DAYS`].
    pub seed_days: u32,
    /// Maximum number of records retained (FIFO eviction beyond it).
    pub history_capacity: usize,
    /// Site local time offset from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            live_tick_hours: 0.001,
            backfill_hours: 1.0,
            seed_days: 30,
            history_capacity: 1000,
            utc_offset_minutes: 330,
        }
    }
}

impl SimulationConfig {
    /// Site local offset. Falls back to UTC for an out-of-range value,
    /// which [`AppConfig::validate`] reports separately.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes.saturating_mul(60)).unwrap_or(Utc.fix())
    }
}

/// Upstream weather lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Provider: `"open-meteo"` (live lookup) or `"offline"` (time-of-day table).
    pub provider: String,
    /// Open-Meteo geocoding endpoint.
    pub geocoding_url: String,
    /// Open-Meteo forecast endpoint.
    pub forecast_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            provider: "open-meteo".to_string(),
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timeout_secs: 5,
        }
    }
}

/// Static login credentials for the demo login endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    /// Token returned on a successful login.
    pub token: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            token: "demo-token".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.battery_size_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl AppConfig {
    /// Available weather provider names.
    pub const PROVIDERS: &[&str] = &["open-meteo", "offline"];

    /// Parses configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = self
            .site
            .validate()
            .into_iter()
            .map(|e| ConfigError::new(format!("site.{}", e.field), e.message))
            .collect::<Vec<_>>();

        let s = &self.simulation;
        if !(s.live_tick_hours > 0.0 && s.live_tick_hours.is_finite()) {
            errors.push(ConfigError::new("simulation.live_tick_hours", "must be > 0"));
        }
        if !(s.backfill_hours > 0.0 && s.backfill_hours.is_finite()) {
            errors.push(ConfigError::new("simulation.backfill_hours", "must be > 0"));
        }
        if s.seed_days > MAX_SEED_DAYS {
            errors.push(ConfigError::new(
                "simulation.seed_days",
                format!("must be <= {MAX_SEED_DAYS}, got {}", s.seed_days),
            ));
        }
        if s.history_capacity == 0 {
            errors.push(ConfigError::new("simulation.history_capacity", "must be > 0"));
        }
        if FixedOffset::east_opt(s.utc_offset_minutes.saturating_mul(60)).is_none() {
            errors.push(ConfigError::new(
                "simulation.utc_offset_minutes",
                "must be within (-1440, 1440)",
            ));
        }

        let w = &self.weather;
        if !Self::PROVIDERS.contains(&w.provider.as_str()) {
            errors.push(ConfigError::new(
                "weather.provider",
                format!(
                    "must be one of {}, got \"{}\"",
                    Self::PROVIDERS.join(", "),
                    w.provider
                ),
            ));
        }
        if w.timeout_secs == 0 {
            errors.push(ConfigError::new("weather.timeout_secs", "must be > 0"));
        }

        if self.server.port == 0 {
            errors.push(ConfigError::new("server.port", "must be > 0"));
        }

        errors
    }
}
