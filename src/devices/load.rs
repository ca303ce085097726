use rand::Rng;

use crate::devices::types::{round_to, uniform};

/// Random spread applied around the configured base load.
pub const LOAD_JITTER: (f64, f64) = (0.8, 1.2);

/// Multiplier for the morning and evening household peaks.
const PEAK_FACTOR: f64 = 1.5;
/// Multiplier outside the peaks.
const OFF_PEAK_FACTOR: f64 = 0.8;

/// Diurnal usage factor for a site-local hour.
///
/// Peaks over the 07–10 and 18–21 hour blocks (inclusive), lower otherwise.
pub fn usage_factor(local_hour: u32) -> f64 {
    match local_hour {
        7..=10 | 18..=21 => PEAK_FACTOR,
        _ => OFF_PEAK_FACTOR,
    }
}

/// Live site consumption (kW, two decimals).
pub fn consumption_kw<R: Rng>(base_kw: f64, rng: &mut R) -> f64 {
    round_to(base_kw * uniform(rng, LOAD_JITTER.0, LOAD_JITTER.1), 2)
}

/// Backfilled consumption for an hourly slot, shaped by [`usage_factor`].
pub fn hourly_consumption_kw<R: Rng>(base_kw: f64, local_hour: u32, rng: &mut R) -> f64 {
    let jitter = uniform(rng, LOAD_JITTER.0, LOAD_JITTER.1);
    round_to(base_kw * usage_factor(local_hour) * jitter, 2)
}
