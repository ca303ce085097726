use crate::config::ConfigError;

/// Charge level a fresh ledger starts from when there is no history.
pub const INITIAL_CHARGE_PERCENT: f64 = 50.0;

/// Running battery state of charge, in percent.
///
/// The ledger is the single source of truth for charge across steps. It keeps
/// full precision internally; records round it for display.
///
/// # Integration
///
/// Each step integrates net power over `hours_per_step`:
///
/// ```text
/// delta% = (net_kw / battery_size_kwh) * 100 * hours_per_step
/// ```
///
/// Live ticks use a tiny step (a gentle nudge per request), backfill uses a
/// full hour per sample. Both are the same formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryLedger {
    charge_percent: f64,
}

impl Default for BatteryLedger {
    fn default() -> Self {
        Self::new(INITIAL_CHARGE_PERCENT)
    }
}

impl BatteryLedger {
    /// Creates a ledger at `charge_percent`, clamped to `[0, 100]`.
    ///
    /// A non-finite value falls back to [`INITIAL_CHARGE_PERCENT`].
    pub fn new(charge_percent: f64) -> Self {
        let charge_percent = if charge_percent.is_finite() {
            charge_percent.clamp(0.0, 100.0)
        } else {
            INITIAL_CHARGE_PERCENT
        };
        Self { charge_percent }
    }

    /// Current state of charge in percent.
    pub fn charge_percent(&self) -> f64 {
        self.charge_percent
    }

    /// Advances the ledger by one step and returns the new charge.
    ///
    /// # Arguments
    ///
    /// * `total_generation_kw` - Solar plus wind output
    /// * `consumption_kw` - Site load
    /// * `battery_size_kwh` - Usable capacity (must be > 0)
    /// * `hours_per_step` - Integration interval in hours (must be >= 0)
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the battery size is not positive or the
    /// step length is negative. The ledger is left unchanged in that case.
    pub fn step(
        &mut self,
        total_generation_kw: f64,
        consumption_kw: f64,
        battery_size_kwh: f64,
        hours_per_step: f64,
    ) -> Result<f64, ConfigError> {
        if !(battery_size_kwh > 0.0 && battery_size_kwh.is_finite()) {
            return Err(ConfigError::new(
                "battery_size",
                format!("must be a positive number, got {battery_size_kwh}"),
            ));
        }
        if !(hours_per_step >= 0.0 && hours_per_step.is_finite()) {
            return Err(ConfigError::new(
                "hours_per_step",
                format!("must be non-negative, got {hours_per_step}"),
            ));
        }

        let net_kw = total_generation_kw - consumption_kw;
        let delta = net_kw / battery_size_kwh * 100.0 * hours_per_step;
        let next = self.charge_percent + delta;
        // NaN from non-finite power readings keeps the previous charge.
        if !next.is_nan() {
            self.charge_percent = next.clamp(0.0, 100.0);
        }
        Ok(self.charge_percent)
    }
}
