//! Weather snapshots and the providers that produce them.
//!
//! The simulation only ever sees a [`WeatherSnapshot`]. Providers never fail
//! outright: a lookup problem yields a [`WeatherReport`] carrying the
//! time-of-day fallback plus the error that caused it.

mod offline;
mod open_meteo;

pub use offline::OfflineWeather;
pub use open_meteo::OpenMeteoClient;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::WeatherConfig;

/// Coarse weather condition, as reported by OpenWeatherMap-style `main` labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionClass {
    Clear,
    Clouds,
    Mist,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl ConditionClass {
    /// Label used in records and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Mist => "Mist",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Thunderstorm => "Thunderstorm",
        }
    }
}

impl fmt::Display for ConditionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current weather at the site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    /// Resolved city name (may differ from the requested one).
    pub city: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_percent: f64,
    /// Cloud cover, 0 to 100.
    pub cloud_percent: f64,
    pub condition: ConditionClass,
    pub description: String,
    pub wind_speed: f64,
    pub pressure_hpa: f64,
    pub visibility_km: f64,
    /// OpenWeatherMap icon code, e.g. `01d`.
    pub icon: String,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Reasons a live weather lookup can fail.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("City '{0}' not found")]
    CityNotFound(String),

    #[error("invalid weather response: {0}")]
    InvalidResponse(String),
}

/// Outcome of a provider call: always carries a usable snapshot.
#[derive(Debug)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    /// Set when `snapshot` is the fallback rather than live data.
    pub error: Option<WeatherError>,
}

impl WeatherReport {
    pub fn live(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot,
            error: None,
        }
    }

    pub fn fallback(snapshot: WeatherSnapshot, error: WeatherError) -> Self {
        Self {
            snapshot,
            error: Some(error),
        }
    }

    pub fn is_live(&self) -> bool {
        self.error.is_none()
    }
}

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Looks up current weather for `city`; falls back instead of failing.
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport;
}

/// Converts a site-local wall-clock time on `now`'s local date to UTC.
pub(crate) fn local_time_today(
    now: DateTime<Utc>,
    offset: FixedOffset,
    hour: u32,
    minute: u32,
) -> DateTime<Utc> {
    let date = now.with_timezone(&offset).date_naive();
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map_or(now, |dt| dt.with_timezone(&Utc))
}

/// Deterministic stand-in used when the live lookup is unavailable.
///
/// Follows a warm tropical day: hazy mornings, sunny early afternoons, a
/// cloudier late afternoon and clear nights. Sunrise is 06:00 and sunset
/// 18:30 site-local time on the current day.
pub fn fallback_snapshot(city: &str, now: DateTime<Utc>, offset: FixedOffset) -> WeatherSnapshot {
    let hour = now.with_timezone(&offset).hour();

    let (temperature_c, condition, description) = match hour {
        12..=15 => (32.0, ConditionClass::Clear, "sunny"),
        10..=11 => (30.0, ConditionClass::Clear, "clear sky"),
        16..=18 => (29.0, ConditionClass::Clouds, "partly cloudy"),
        6..=9 => (26.0, ConditionClass::Mist, "haze"),
        _ => (24.0, ConditionClass::Clear, "clear night"),
    };
    let icon = if (6..=18).contains(&hour) { "01d" } else { "01n" };

    WeatherSnapshot {
        city: city.to_string(),
        temperature_c,
        feels_like_c: temperature_c + 2.0,
        humidity_percent: 65.0,
        cloud_percent: 20.0,
        condition,
        description: description.to_string(),
        wind_speed: 3.5,
        pressure_hpa: 1013.0,
        visibility_km: 10.0,
        icon: icon.to_string(),
        sunrise: local_time_today(now, offset, 6, 0),
        sunset: local_time_today(now, offset, 18, 30),
    }
}

/// Maps an OpenWeatherMap icon code to a display emoji.
pub fn icon_emoji(icon: &str) -> &'static str {
    match icon {
        "01d" => "☀️",
        "01n" => "🌙",
        "02d" => "⛅",
        "02n" | "03d" | "03n" | "04d" | "04n" => "☁️",
        "09d" | "09n" | "10n" => "🌧️",
        "10d" => "🌦️",
        "11d" | "11n" => "⛈️",
        "13d" | "13n" => "🌨️",
        "50d" | "50n" => "🌫️",
        _ => "🌤️",
    }
}

/// Builds the provider named by `config.provider`.
///
/// Any name other than `"offline"` selects Open-Meteo; provider names are
/// checked by [`crate::config::AppConfig::validate`] before this runs.
///
/// # Errors
///
/// Returns `WeatherError::Http` if the HTTP client cannot be constructed.
pub fn provider_from_config(
    config: &WeatherConfig,
    offset: FixedOffset,
) -> Result<Arc<dyn WeatherProvider>, WeatherError> {
    if config.provider == "offline" {
        return Ok(Arc::new(OfflineWeather::new(offset)));
    }
    Ok(Arc::new(OpenMeteoClient::new(config, offset)?))
}
