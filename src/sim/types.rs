//! Core simulation types: the per-step energy record and tick context.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::WeatherSnapshot;

/// One immutable entry in the energy history.
///
/// Produced only by the engine's live tick or the history seeder. Power values
/// are rounded to two decimals; battery, efficiency and temperature to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLogRecord {
    /// When the sample was taken (UTC).
    pub timestamp: DateTime<Utc>,
    /// Solar output (kW, >= 0).
    pub solar_kw: f64,
    /// Wind output (kW, >= 0).
    pub wind_kw: f64,
    /// `solar_kw + wind_kw` (kW).
    pub total_generation_kw: f64,
    /// Site load (kW, >= 0).
    pub consumption_kw: f64,
    /// Battery state of charge after this step (0 to 100).
    pub battery_percent: f64,
    /// Power drawn from the grid (kW, >= 0).
    pub grid_import_kw: f64,
    /// Power pushed to the grid (kW, >= 0).
    pub grid_export_kw: f64,
    /// Panel efficiency after thermal derating (percent).
    pub efficiency_percent: f64,
    pub temperature_c: f64,
    /// Condition label, e.g. `Clear`.
    pub weather: String,
}

impl fmt::Display for EnergyLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | solar={:>5.2} kW  wind={:>4.2} kW  load={:>5.2} kW | \
             bat={:>5.1}% | grid(in={:.2}, out={:.2}) | eff={:.1}%  {:.1}°C {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.solar_kw,
            self.wind_kw,
            self.consumption_kw,
            self.battery_percent,
            self.grid_import_kw,
            self.grid_export_kw,
            self.efficiency_percent,
            self.temperature_c,
            self.weather,
        )
    }
}

/// Everything a single tick produced, for callers that need more than the
/// stored record (the energy endpoint derives its extra fields from this).
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub record: EnergyLogRecord,
    pub weather: WeatherSnapshot,
    /// Sunlight factor in `[0, 1]` used for this tick.
    pub sunlight: f64,
}
