//! Simulation engine that turns configuration and weather into energy records.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::{ConfigError, MAX_SEED_DAYS, SimulationConfig};
use crate::devices::types::round_to;
use crate::devices::{BatteryLedger, generate, load, sunlight_factor};
use crate::site::SiteConfig;
use crate::weather::WeatherSnapshot;

use super::clock::SlotClock;
use super::history::HistoryStore;
use super::power_balance::grid_exchange;
use super::seeder::synthetic_weather;
use super::types::{EnergyLogRecord, TickOutcome};

/// Temperature above which panel efficiency is derated.
const DERATING_THRESHOLD_C: f64 = 25.0;
/// Efficiency points lost per degree above the threshold.
const DERATING_PER_DEGREE: f64 = 0.5;

/// Timing parameters shared by live ticks and the backfill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Hours integrated by one live tick.
    pub live_tick_hours: f64,
    /// Hours integrated by one backfill sample.
    pub backfill_hours: f64,
    /// Site-local offset for hour-of-day and calendar-day logic.
    pub offset: FixedOffset,
}

impl From<&SimulationConfig> for EngineSettings {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            live_tick_hours: config.live_tick_hours,
            backfill_hours: config.backfill_hours,
            offset: config.offset(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&SimulationConfig::default())
    }
}

/// Thermally derated panel efficiency (percent, one decimal).
pub fn derated_efficiency(panel_efficiency: f64, temperature_c: f64) -> f64 {
    let derating = ((temperature_c - DERATING_THRESHOLD_C) * DERATING_PER_DEGREE).max(0.0);
    round_to(panel_efficiency * 100.0 - derating, 1)
}

/// Stateful simulation engine owning the history and the battery ledger.
///
/// Generic over the random source so tests can inject a seeded `StdRng`.
/// Callers serialize access (the API wraps it in a mutex); every method that
/// mutates either completes fully or leaves the engine untouched.
pub struct Engine<R: Rng> {
    settings: EngineSettings,
    history: HistoryStore,
    ledger: BatteryLedger,
    rng: R,
}

impl<R: Rng> Engine<R> {
    /// Creates an engine with an empty history and a half-charged battery.
    pub fn new(settings: EngineSettings, history_capacity: usize, rng: R) -> Self {
        Self::with_history(settings, HistoryStore::new(history_capacity), rng)
    }

    /// Creates an engine over existing history.
    ///
    /// The ledger resumes from the newest record's battery level.
    pub fn with_history(settings: EngineSettings, history: HistoryStore, rng: R) -> Self {
        let ledger = history
            .last()
            .map(|r| BatteryLedger::new(r.battery_percent))
            .unwrap_or_default();
        Self {
            settings,
            history,
            ledger,
            rng,
        }
    }

    /// Executes one live tick against `weather` and appends the record.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` if `site` is invalid. Nothing is
    /// appended and the battery is unchanged in that case.
    pub fn tick(
        &mut self,
        site: &SiteConfig,
        weather: &WeatherSnapshot,
        now: DateTime<Utc>,
    ) -> Result<TickOutcome, ConfigError> {
        ensure_valid(site)?;

        let consumption_kw = load::consumption_kw(site.consumption_base_kw, &mut self.rng);
        let (record, sunlight) = self.step(
            site,
            weather,
            now,
            consumption_kw,
            self.settings.live_tick_hours,
        )?;
        debug!(
            solar = record.solar_kw,
            wind = record.wind_kw,
            load = record.consumption_kw,
            battery = record.battery_percent,
            "tick"
        );
        self.history.push(record.clone());

        Ok(TickOutcome {
            record,
            weather: weather.clone(),
            sunlight,
        })
    }

    /// Backfills `days` of hourly records ending at `now`.
    ///
    /// No-op when history already holds records, so repeated calls never
    /// duplicate data. Returns the number of records added.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` if `site` is invalid or `days`
    /// exceeds [`MAX_SEED_DAYS`]; history and battery are left as they were.
    pub fn seed_history(
        &mut self,
        site: &SiteConfig,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, ConfigError> {
        if !self.history.is_empty() {
            debug!(records = self.history.len(), "history present, skipping seed");
            return Ok(0);
        }
        ensure_valid(site)?;
        let out_of_range = || {
            ConfigError::new(
                "seed_days",
                format!("must be <= {MAX_SEED_DAYS}, got {days}"),
            )
        };
        if days > MAX_SEED_DAYS {
            return Err(out_of_range());
        }

        let offset = self.settings.offset;
        let hours = self.settings.backfill_hours;
        let saved_ledger = self.ledger;
        let mut clock = SlotClock::hourly_backfill(now, days).ok_or_else(out_of_range)?;
        let mut records = Vec::with_capacity(clock.remaining());

        while let Some(slot) = clock.tick() {
            let weather = synthetic_weather(&site.city, slot, offset, &mut self.rng);
            let local_hour = slot.with_timezone(&offset).hour();
            let consumption_kw =
                load::hourly_consumption_kw(site.consumption_base_kw, local_hour, &mut self.rng);
            match self.step(site, &weather, slot, consumption_kw, hours) {
                Ok((record, _)) => records.push(record),
                Err(e) => {
                    self.ledger = saved_ledger;
                    return Err(e);
                }
            }
        }

        let added = records.len();
        self.history.extend(records);
        info!(
            days,
            records = added,
            battery = self.ledger.charge_percent(),
            "seeded history"
        );
        Ok(added)
    }

    /// Computes one record and advances the ledger by `hours`.
    fn step(
        &mut self,
        site: &SiteConfig,
        weather: &WeatherSnapshot,
        at: DateTime<Utc>,
        consumption_kw: f64,
        hours: f64,
    ) -> Result<(EnergyLogRecord, f64), ConfigError> {
        let sunlight = sunlight_factor(weather, at);
        let generation = generate(site, sunlight, &mut self.rng);
        let total_kw = generation.total_kw();

        let charge =
            self.ledger
                .step(total_kw, consumption_kw, site.battery_size_kwh, hours)?;
        let grid = grid_exchange(total_kw, consumption_kw, charge);

        let record = EnergyLogRecord {
            timestamp: at,
            solar_kw: generation.solar_kw,
            wind_kw: generation.wind_kw,
            total_generation_kw: total_kw,
            consumption_kw,
            battery_percent: round_to(charge, 1),
            grid_import_kw: grid.import_kw,
            grid_export_kw: grid.export_kw,
            efficiency_percent: derated_efficiency(site.panel_efficiency, weather.temperature_c),
            temperature_c: round_to(weather.temperature_c, 1),
            weather: weather.condition.to_string(),
        };
        Ok((record, sunlight))
    }

    /// Returns a reference to the stored history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Current battery charge at full precision.
    pub fn battery_percent(&self) -> f64 {
        self.ledger.charge_percent()
    }

    /// Returns a reference to the timing settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

fn ensure_valid(site: &SiteConfig) -> Result<(), ConfigError> {
    match site.validate().into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
