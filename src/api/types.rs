//! API request and response types.
//!
//! Field names follow the dashboard's JSON contract, which differs from the
//! internal unit-suffixed names (`solar_kw` → `solar_generation`, etc.).

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::sim::kpi::{BatteryStatus, EnergyMetrics};
use crate::sim::types::{EnergyLogRecord, TickOutcome};
use crate::site::SiteConfig;
use crate::weather::{WeatherSnapshot, icon_emoji};

/// `GET /api/energy` payload: the tick's record plus derived metrics and
/// the weather it was computed from.
#[derive(Debug, Serialize)]
pub struct EnergyResponse {
    pub solar_generation: f64,
    pub wind_generation: f64,
    pub total_generation: f64,
    pub consumption: f64,
    pub battery: f64,
    pub battery_status: BatteryStatus,
    pub backup_time: f64,
    pub temperature: f64,
    pub efficiency: f64,
    pub co2_saved: f64,
    pub savings: f64,
    /// Site-local `HH:MM:SS`.
    pub timestamp: String,
    pub grid_import: f64,
    pub grid_export: f64,
    pub panel_voltage: f64,
    pub panel_temperature: f64,
    pub performance_score: f64,
    pub weather: String,
    pub weather_description: String,
    pub sunlight_level: f64,
    pub clouds: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub city: String,
    pub weather_icon: &'static str,
}

impl EnergyResponse {
    pub fn new(outcome: &TickOutcome, metrics: EnergyMetrics, offset: FixedOffset) -> Self {
        let r = &outcome.record;
        let w = &outcome.weather;
        Self {
            solar_generation: r.solar_kw,
            wind_generation: r.wind_kw,
            total_generation: r.total_generation_kw,
            consumption: r.consumption_kw,
            battery: r.battery_percent,
            battery_status: metrics.battery_status,
            backup_time: metrics.backup_time,
            temperature: r.temperature_c,
            efficiency: r.efficiency_percent,
            co2_saved: metrics.co2_saved,
            savings: metrics.savings,
            timestamp: clock_label(r, offset),
            grid_import: r.grid_import_kw,
            grid_export: r.grid_export_kw,
            panel_voltage: metrics.panel_voltage,
            panel_temperature: metrics.panel_temperature,
            performance_score: metrics.performance_score,
            weather: w.condition.to_string(),
            weather_description: w.description.clone(),
            sunlight_level: metrics.sunlight_level,
            clouds: w.cloud_percent,
            humidity: w.humidity_percent,
            wind_speed: w.wind_speed,
            city: w.city.clone(),
            weather_icon: icon_emoji(&w.icon),
        }
    }
}

/// One `GET /api/history` entry.
#[derive(Debug, Serialize)]
pub struct HistoryPoint {
    /// Site-local `HH:MM:SS`.
    pub timestamp: String,
    pub solar_generation: f64,
    pub wind_generation: f64,
    pub total_generation: f64,
    pub consumption: f64,
    pub battery: f64,
    pub temperature: f64,
    pub efficiency: f64,
}

impl HistoryPoint {
    pub fn new(record: &EnergyLogRecord, offset: FixedOffset) -> Self {
        Self {
            timestamp: clock_label(record, offset),
            solar_generation: record.solar_kw,
            wind_generation: record.wind_kw,
            total_generation: record.total_generation_kw,
            consumption: record.consumption_kw,
            battery: record.battery_percent,
            temperature: record.temperature_c,
            efficiency: record.efficiency_percent,
        }
    }
}

fn clock_label(record: &EnergyLogRecord, offset: FixedOffset) -> String {
    record
        .timestamp
        .with_timezone(&offset)
        .format("%H:%M:%S")
        .to_string()
}

/// Site configuration as exposed to clients.
#[derive(Debug, Serialize)]
pub struct ConfigView {
    pub city: String,
    pub solar_capacity: f64,
    pub battery_size: f64,
    pub panel_efficiency: f64,
    pub consumption_base: f64,
    /// Empty string when no key is stored.
    pub weather_api_key: String,
}

impl From<SiteConfig> for ConfigView {
    fn from(site: SiteConfig) -> Self {
        Self {
            city: site.city,
            solar_capacity: site.solar_capacity_kw,
            battery_size: site.battery_size_kwh,
            panel_efficiency: site.panel_efficiency,
            consumption_base: site.consumption_base_kw,
            weather_api_key: site.weather_api_key.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: ConfigView,
}

#[derive(Debug, Serialize)]
pub struct ConfigUpdateResponse {
    pub success: bool,
    pub message: &'static str,
    pub config: ConfigView,
}

/// `GET /api/weather` query.
#[derive(Debug, Default, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Weather as exposed to clients; sun times are Unix seconds.
#[derive(Debug, Serialize)]
pub struct WeatherView {
    pub city: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub clouds: f64,
    pub weather: String,
    pub description: String,
    pub wind_speed: f64,
    pub sunrise: i64,
    pub sunset: i64,
    pub visibility: f64,
    pub pressure: f64,
    pub icon: String,
    pub sunlight_factor: f64,
    pub icon_emoji: &'static str,
}

impl WeatherView {
    pub fn new(snapshot: WeatherSnapshot, sunlight_factor: f64) -> Self {
        Self {
            icon_emoji: icon_emoji(&snapshot.icon),
            weather: snapshot.condition.to_string(),
            sunrise: snapshot.sunrise.timestamp(),
            sunset: snapshot.sunset.timestamp(),
            city: snapshot.city,
            temperature: snapshot.temperature_c,
            feels_like: snapshot.feels_like_c,
            humidity: snapshot.humidity_percent,
            clouds: snapshot.cloud_percent,
            description: snapshot.description,
            wind_speed: snapshot.wind_speed,
            visibility: snapshot.visibility_km,
            pressure: snapshot.pressure_hpa,
            icon: snapshot.icon,
            sunlight_factor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub weather: WeatherView,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}
