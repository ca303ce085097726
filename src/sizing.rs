//! Standalone rooftop-system sizing calculator.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::devices::types::round_to;

/// Average daily peak-sun hours assumed for sizing.
const PEAK_SUN_HOURS: f64 = 5.0;
/// Rated output of one panel (kW).
const PANEL_KW: f64 = 0.4;
/// Battery autonomy in days of load.
const BATTERY_DAYS: f64 = 2.0;

const PANEL_COST: f64 = 200.0;
const BATTERY_COST_PER_KWH: f64 = 300.0;
const INVERTER_COST_PER_KW: f64 = 500.0;
/// Installation markup over hardware cost.
const INSTALL_FACTOR: f64 = 1.2;
/// Tariff used to value avoided grid energy (per kWh).
const TARIFF_PER_KWH: f64 = 0.12;
const CO2_KG_PER_KWH: f64 = 0.92;

/// Sizing request; the load defaults to 10 kWh/day.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SizingRequest {
    #[serde(alias = "daily_load_kwh", alias = "dailyLoadKwh")]
    pub daily_load: f64,
}

impl Default for SizingRequest {
    fn default() -> Self {
        Self { daily_load: 10.0 }
    }
}

/// Sized system and its economics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizingReport {
    pub system_size_kw: f64,
    pub num_panels: u32,
    pub battery_capacity_kwh: f64,
    pub total_cost: f64,
    pub annual_savings: f64,
    pub payback_period_years: f64,
    pub co2_reduction_kg_year: f64,
}

/// Sizes a system for `daily_load_kwh` of consumption.
///
/// # Errors
///
/// Returns a `ConfigError` for a non-positive or non-finite load.
///
/// # Examples
///
/// ```
/// use renewable_sim::sizing::size_system;
///
/// let report = size_system(10.0).unwrap();
/// assert_eq!(report.system_size_kw, 2.0);
/// assert_eq!(report.num_panels, 5);
/// assert_eq!(report.battery_capacity_kwh, 20.0);
/// ```
pub fn size_system(daily_load_kwh: f64) -> Result<SizingReport, ConfigError> {
    if !(daily_load_kwh > 0.0 && daily_load_kwh.is_finite()) {
        return Err(ConfigError::new(
            "daily_load",
            format!("must be a positive number, got {daily_load_kwh}"),
        ));
    }

    let size_kw = daily_load_kwh / PEAK_SUN_HOURS;
    let panels = (size_kw / PANEL_KW).ceil();
    let battery_kwh = daily_load_kwh * BATTERY_DAYS;
    let cost = (panels * PANEL_COST
        + battery_kwh * BATTERY_COST_PER_KWH
        + size_kw * INVERTER_COST_PER_KW)
        * INSTALL_FACTOR;
    let annual_savings = daily_load_kwh * 365.0 * TARIFF_PER_KWH;

    Ok(SizingReport {
        system_size_kw: round_to(size_kw, 2),
        num_panels: panels as u32,
        battery_capacity_kwh: round_to(battery_kwh, 2),
        total_cost: round_to(cost, 2),
        annual_savings: round_to(annual_savings, 2),
        payback_period_years: round_to(cost / annual_savings, 1),
        co2_reduction_kg_year: round_to(daily_load_kwh * 365.0 * CO2_KG_PER_KWH, 2),
    })
}
