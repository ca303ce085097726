//! Open-Meteo adapter: geocoding followed by a current-conditions lookup.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{
    ConditionClass, WeatherError, WeatherProvider, WeatherReport, WeatherSnapshot,
    fallback_snapshot,
};
use crate::config::WeatherConfig;
use crate::devices::types::round_to;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,is_day,\
                              weather_code,cloud_cover,pressure_msl,wind_speed_10m";

/// Open-Meteo client. Needs no API key.
pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    forecast_url: String,
    fallback_offset: FixedOffset,
}

impl OpenMeteoClient {
    /// Creates a client with the configured endpoints and request timeout.
    ///
    /// `fallback_offset` is the site offset used to build fallback snapshots.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError::Http` if the HTTP client cannot be constructed.
    pub fn new(config: &WeatherConfig, fallback_offset: FixedOffset) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            geocoding_url: config.geocoding_url.clone(),
            forecast_url: config.forecast_url.clone(),
            fallback_offset,
        })
    }

    async fn geocode(&self, city: &str) -> Result<GeoResult, WeatherError> {
        let response: GeocodingResponse = self
            .client
            .get(&self.geocoding_url)
            .query(&[("name", city), ("count", "1"), ("format", "json")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))
    }

    /// Performs the live lookup without falling back.
    ///
    /// # Errors
    ///
    /// Returns `WeatherError` on network failure, an unknown city, or a
    /// response missing the expected fields.
    pub async fn lookup(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let place = self.geocode(city).await?;
        debug!(city, resolved = %place.name, lat = place.latitude, lon = place.longitude, "geocoded city");

        let params = [
            ("latitude", place.latitude.to_string()),
            ("longitude", place.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("daily", "sunrise,sunset".to_string()),
            ("timezone", "auto".to_string()),
        ];
        let forecast: ForecastResponse = self
            .client
            .get(&self.forecast_url)
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        forecast.into_snapshot(place.name)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport {
        match self.lookup(city).await {
            Ok(snapshot) => WeatherReport::live(snapshot),
            Err(e) => {
                warn!(city, error = %e, "weather lookup failed, using fallback");
                WeatherReport::fallback(fallback_snapshot(city, now, self.fallback_offset), e)
            }
        }
    }
}

/// Maps a WMO weather code to a condition, description and icon code.
pub(crate) fn wmo_condition(code: u16, is_day: bool) -> (ConditionClass, &'static str, String) {
    let suffix = if is_day { 'd' } else { 'n' };
    let (condition, description, icon) = match code {
        1..=3 => (ConditionClass::Clouds, "partly cloudy", "02"),
        45 | 48 => (ConditionClass::Mist, "foggy", "50"),
        51 | 53 | 55 => (ConditionClass::Drizzle, "light drizzle", "09"),
        56 | 57 => (ConditionClass::Drizzle, "freezing drizzle", "09"),
        61 | 63 | 65 => (ConditionClass::Rain, "rain", "10"),
        66 | 67 => (ConditionClass::Rain, "freezing rain", "10"),
        71 | 73 | 75 | 77 => (ConditionClass::Snow, "snowfall", "13"),
        80..=82 => (ConditionClass::Rain, "rain showers", "09"),
        85 | 86 => (ConditionClass::Snow, "snow showers", "13"),
        95 | 96 | 99 => (ConditionClass::Thunderstorm, "thunderstorm", "11"),
        _ => (ConditionClass::Clear, "clear sky", "01"),
    };
    (condition, description, format!("{icon}{suffix}"))
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeoResult>>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    utc_offset_seconds: i32,
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    is_day: u8,
    weather_code: u16,
    cloud_cover: f64,
    pressure_msl: f64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    sunrise: Vec<String>,
    sunset: Vec<String>,
}

impl ForecastResponse {
    fn into_snapshot(self, city: String) -> Result<WeatherSnapshot, WeatherError> {
        let offset = FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            WeatherError::InvalidResponse(format!("utc offset {}", self.utc_offset_seconds))
        })?;
        let sunrise = parse_local(self.daily.sunrise.first(), offset)?;
        let sunset = parse_local(self.daily.sunset.first(), offset)?;

        let c = self.current;
        let (condition, description, icon) = wmo_condition(c.weather_code, c.is_day == 1);

        Ok(WeatherSnapshot {
            city,
            temperature_c: round_to(c.temperature_2m, 1),
            feels_like_c: round_to(c.apparent_temperature, 1),
            humidity_percent: c.relative_humidity_2m,
            cloud_percent: c.cloud_cover.clamp(0.0, 100.0),
            condition,
            description: description.to_string(),
            wind_speed: round_to(c.wind_speed_10m, 1),
            pressure_hpa: c.pressure_msl.round(),
            // not provided by the free tier
            visibility_km: 10.0,
            icon,
            sunrise,
            sunset,
        })
    }
}

/// Parses an Open-Meteo local ISO timestamp (`2024-06-01T06:01`) into UTC.
fn parse_local(raw: Option<&String>, offset: FixedOffset) -> Result<DateTime<Utc>, WeatherError> {
    let raw = raw.ok_or_else(|| WeatherError::InvalidResponse("missing sun times".into()))?;
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map_err(|e| WeatherError::InvalidResponse(format!("sun time \"{raw}\": {e}")))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| WeatherError::InvalidResponse(format!("ambiguous sun time \"{raw}\"")))
}
