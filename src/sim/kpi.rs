//! Derived indicators: per-tick dashboard metrics and post-hoc history KPIs.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::devices::types::{round_to, uniform};
use crate::site::SiteConfig;

use super::types::{EnergyLogRecord, TickOutcome};

/// kg of CO2 avoided per kWh of renewable output.
pub const CO2_KG_PER_KWH: f64 = 0.92;
/// Currency saved per kWh of renewable output.
pub const SAVINGS_PER_KWH: f64 = 8.0;
/// Floor on consumption when estimating backup time (kW).
const MIN_BACKUP_LOAD_KW: f64 = 0.1;

/// Battery status label shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryStatus {
    Charging,
    Optimal,
    Low,
}

impl BatteryStatus {
    pub fn from_percent(percent: f64) -> Self {
        if percent > 80.0 {
            Self::Charging
        } else if percent < 20.0 {
            Self::Low
        } else {
            Self::Optimal
        }
    }
}

/// Metrics derived from one tick for the energy endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyMetrics {
    pub co2_saved: f64,
    pub savings: f64,
    pub performance_score: f64,
    pub battery_status: BatteryStatus,
    /// Hours the battery could carry the current load.
    pub backup_time: f64,
    pub panel_voltage: f64,
    pub panel_temperature: f64,
    /// Sunlight factor as a percentage.
    pub sunlight_level: f64,
}

impl EnergyMetrics {
    /// Derives dashboard metrics from a tick.
    ///
    /// Backup time divides by the instantaneous load (floored at 0.1 kW),
    /// not by the net deficit.
    pub fn derive<R: Rng>(outcome: &TickOutcome, site: &SiteConfig, rng: &mut R) -> Self {
        let r = &outcome.record;
        let total = r.total_generation_kw;
        let performance =
            (r.efficiency_percent + r.battery_percent * 0.3 + total.min(site.solar_capacity_kw) * 5.0)
                / 2.0;
        let backup = r.battery_percent / 100.0 * site.battery_size_kwh
            / r.consumption_kw.max(MIN_BACKUP_LOAD_KW);

        Self {
            co2_saved: round_to(total * CO2_KG_PER_KWH, 2),
            savings: round_to(total * SAVINGS_PER_KWH, 2),
            performance_score: round_to(performance, 1),
            battery_status: BatteryStatus::from_percent(r.battery_percent),
            backup_time: round_to(backup, 1),
            panel_voltage: round_to(uniform(rng, 380.0, 420.0), 1),
            panel_temperature: round_to(r.temperature_c + uniform(rng, 5.0, 15.0), 1),
            sunlight_level: round_to(outcome.sunlight * 100.0, 1),
        }
    }
}

/// Aggregate indicators over a slice of stored records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryKpis {
    pub records: usize,
    pub avg_solar_kw: f64,
    pub avg_wind_kw: f64,
    pub avg_consumption_kw: f64,
    pub peak_import_kw: f64,
    pub peak_export_kw: f64,
    pub min_battery_percent: f64,
    pub max_battery_percent: f64,
    /// Records where the grid was used in either direction.
    pub grid_steps: usize,
}

impl HistoryKpis {
    /// Computes KPIs from records in any order.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a EnergyLogRecord>) -> Self {
        let mut kpis = Self {
            min_battery_percent: f64::INFINITY,
            max_battery_percent: f64::NEG_INFINITY,
            ..Self::default()
        };
        let (mut solar, mut wind, mut load) = (0.0, 0.0, 0.0);

        for r in records {
            kpis.records += 1;
            solar += r.solar_kw;
            wind += r.wind_kw;
            load += r.consumption_kw;
            kpis.peak_import_kw = kpis.peak_import_kw.max(r.grid_import_kw);
            kpis.peak_export_kw = kpis.peak_export_kw.max(r.grid_export_kw);
            kpis.min_battery_percent = kpis.min_battery_percent.min(r.battery_percent);
            kpis.max_battery_percent = kpis.max_battery_percent.max(r.battery_percent);
            if r.grid_import_kw > 0.0 || r.grid_export_kw > 0.0 {
                kpis.grid_steps += 1;
            }
        }

        if kpis.records == 0 {
            return Self::default();
        }
        let n = kpis.records as f64;
        kpis.avg_solar_kw = solar / n;
        kpis.avg_wind_kw = wind / n;
        kpis.avg_consumption_kw = load / n;
        kpis
    }
}

impl fmt::Display for HistoryKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- History Report ---")?;
        writeln!(f, "Records:             {}", self.records)?;
        writeln!(f, "Avg solar:           {:.2} kW", self.avg_solar_kw)?;
        writeln!(f, "Avg wind:            {:.2} kW", self.avg_wind_kw)?;
        writeln!(f, "Avg consumption:     {:.2} kW", self.avg_consumption_kw)?;
        writeln!(f, "Peak import:         {:.2} kW", self.peak_import_kw)?;
        writeln!(f, "Peak export:         {:.2} kW", self.peak_export_kw)?;
        writeln!(
            f,
            "Battery range:       {:.1}% .. {:.1}%",
            self.min_battery_percent, self.max_battery_percent
        )?;
        write!(f, "Grid steps:          {}", self.grid_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::fixtures::sample_record;
    use crate::weather::fallback_snapshot;
    use chrono::{FixedOffset, Utc};
    use rand::{SeedableRng, rngs::StdRng};

    fn outcome(record: EnergyLogRecord, sunlight: f64) -> TickOutcome {
        TickOutcome {
            weather: fallback_snapshot("Mumbai", Utc::now(), FixedOffset::east_opt(0).unwrap()),
            record,
            sunlight,
        }
    }

    #[test]
    fn battery_status_thresholds() {
        assert_eq!(BatteryStatus::from_percent(80.1), BatteryStatus::Charging);
        assert_eq!(BatteryStatus::from_percent(80.0), BatteryStatus::Optimal);
        assert_eq!(BatteryStatus::from_percent(20.0), BatteryStatus::Optimal);
        assert_eq!(BatteryStatus::from_percent(19.9), BatteryStatus::Low);
    }

    #[test]
    fn derived_metrics_follow_formulas() {
        let mut record = sample_record();
        record.total_generation_kw = 10.0;
        record.battery_percent = 60.0;
        record.efficiency_percent = 80.0;
        record.consumption_kw = 4.0;
        record.temperature_c = 30.0;

        let mut rng = StdRng::seed_from_u64(1);
        let m = EnergyMetrics::derive(&outcome(record, 0.5), &SiteConfig::default(), &mut rng);

        assert_eq!(m.co2_saved, 9.2);
        assert_eq!(m.savings, 80.0);
        // (80 + 18 + 50) / 2
        assert_eq!(m.performance_score, 74.0);
        assert_eq!(m.battery_status, BatteryStatus::Optimal);
        // 0.6 * 10 / 4
        assert_eq!(m.backup_time, 1.5);
        assert_eq!(m.sunlight_level, 50.0);
        assert!((380.0..=420.0).contains(&m.panel_voltage));
        assert!((35.0..=45.0).contains(&m.panel_temperature));
    }

    #[test]
    fn performance_caps_generation_at_capacity() {
        let mut record = sample_record();
        record.total_generation_kw = 25.0;
        record.battery_percent = 0.0;
        record.efficiency_percent = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let m = EnergyMetrics::derive(&outcome(record, 1.0), &SiteConfig::default(), &mut rng);
        assert_eq!(m.performance_score, 25.0);
    }

    #[test]
    fn backup_time_floors_tiny_load() {
        let mut record = sample_record();
        record.battery_percent = 100.0;
        record.consumption_kw = 0.0;
        let mut rng = StdRng::seed_from_u64(1);
        let m = EnergyMetrics::derive(&outcome(record, 0.0), &SiteConfig::default(), &mut rng);
        assert_eq!(m.backup_time, 100.0);
        assert!(m.backup_time.is_finite());
    }

    #[test]
    fn history_kpis_track_extremes() {
        let mut a = sample_record();
        a.grid_import_kw = 1.5;
        a.battery_percent = 3.0;
        let mut b = sample_record();
        b.grid_export_kw = 2.0;
        b.battery_percent = 97.0;
        let c = sample_record();

        let kpis = HistoryKpis::from_records([&a, &b, &c]);
        assert_eq!(kpis.records, 3);
        assert_eq!(kpis.peak_import_kw, 1.5);
        assert_eq!(kpis.peak_export_kw, 2.0);
        assert_eq!(kpis.min_battery_percent, 3.0);
        assert_eq!(kpis.max_battery_percent, 97.0);
        assert_eq!(kpis.grid_steps, 2);
        assert!((kpis.avg_solar_kw - 6.5).abs() < 1e-9);
    }

    #[test]
    fn empty_history_kpis() {
        let kpis = HistoryKpis::from_records(std::iter::empty());
        assert_eq!(kpis, HistoryKpis::default());
        assert!(!format!("{kpis}").is_empty());
    }
}
