//! Next-day generation projection.

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use rand::Rng;
use serde::Serialize;

use crate::devices::types::{round_to, uniform};

/// Hours projected by [`forecast_next_day`].
pub const HORIZON_HOURS: usize = 24;

/// One projected hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Site-local hour label, e.g. `14:00`.
    pub hour: String,
    /// Projected solar output (kW).
    pub predicted_solar: f64,
    /// Projected wind output (kW).
    pub predicted_wind: f64,
}

/// Clear-sky solar shape for a local hour: a half sine from 06:00 to 18:00.
///
/// Returns a fraction of capacity in `[0, 1]`.
pub fn solar_shape(local_hour: u32) -> f64 {
    if (6..=18).contains(&local_hour) {
        let progress = (f64::from(local_hour) - 6.0) / 12.0;
        (progress * std::f64::consts::PI).sin().max(0.0)
    } else {
        0.0
    }
}

/// Projects the next 24 hours starting at `now`.
///
/// A closed-form curve, not a model fit: solar follows [`solar_shape`]
/// scaled by `solar_capacity_kw` and a random haze factor in `[0.8, 1.0]`,
/// wind is uniform in `[1, 4]` kW. Independent of battery state.
pub fn forecast_next_day<R: Rng>(
    solar_capacity_kw: f64,
    now: DateTime<Utc>,
    offset: FixedOffset,
    rng: &mut R,
) -> Vec<ForecastPoint> {
    (0..HORIZON_HOURS)
        .map(|i| {
            let at = (now + Duration::hours(i as i64)).with_timezone(&offset);
            let shape = solar_shape(at.hour());
            let predicted_solar = if shape > 0.0 {
                round_to(solar_capacity_kw * shape * uniform(rng, 0.8, 1.0), 2)
            } else {
                0.0
            };
            ForecastPoint {
                hour: at.format("%H:00").to_string(),
                predicted_solar,
                predicted_wind: round_to(uniform(rng, 1.0, 4.0), 2),
            }
        })
        .collect()
}
