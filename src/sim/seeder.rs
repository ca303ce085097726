//! Synthetic weather for the hourly history backfill.
//!
//! The backfill never calls a weather provider. Each hourly slot gets a
//! snapshot drawn from a coarse seasonal and diurnal table for a tropical
//! site: monsoon months are cooler and often rainy, midday is warmer.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use rand::Rng;

use crate::devices::types::uniform;
use crate::weather::{ConditionClass, WeatherSnapshot, local_time_today};

/// Months (1-based) treated as monsoon season.
pub const MONSOON_MONTHS: std::ops::RangeInclusive<u32> = 6..=9;

const BASE_TEMPERATURE_C: f64 = 30.0;
const MONSOON_COOLING_C: f64 = 5.0;
const MIDDAY_WARMING_C: f64 = 5.0;
const TEMPERATURE_JITTER_C: f64 = 2.0;

const MONSOON_RAIN_PROBABILITY: f64 = 0.4;
const CLOUDY_PROBABILITY: f64 = 0.2;

/// Local sun times used for every synthetic day.
const SUNRISE_HOUR: u32 = 6;
const SUNSET_HOUR: u32 = 18;

/// Whether `month` (1-based) falls in the monsoon season.
pub fn is_monsoon(month: u32) -> bool {
    MONSOON_MONTHS.contains(&month)
}

/// Builds the synthetic snapshot for the slot starting at `slot`.
///
/// Draws temperature jitter first, then the condition, then cloud cover.
pub fn synthetic_weather<R: Rng>(
    city: &str,
    slot: DateTime<Utc>,
    offset: FixedOffset,
    rng: &mut R,
) -> WeatherSnapshot {
    let local = slot.with_timezone(&offset);
    let monsoon = is_monsoon(local.month());

    let mut base = BASE_TEMPERATURE_C;
    if monsoon {
        base -= MONSOON_COOLING_C;
    }
    if (10..=15).contains(&local.hour()) {
        base += MIDDAY_WARMING_C;
    }
    let temperature_c = base + uniform(rng, -TEMPERATURE_JITTER_C, TEMPERATURE_JITTER_C);

    let (condition, cloud_percent, description) =
        if monsoon && rng.random::<f64>() < MONSOON_RAIN_PROBABILITY {
            (ConditionClass::Rain, uniform(rng, 70.0, 100.0), "monsoon rain")
        } else if rng.random::<f64>() < CLOUDY_PROBABILITY {
            (ConditionClass::Clouds, uniform(rng, 30.0, 80.0), "scattered clouds")
        } else {
            (ConditionClass::Clear, uniform(rng, 0.0, 20.0), "clear sky")
        };

    WeatherSnapshot {
        city: city.to_string(),
        temperature_c,
        feels_like_c: temperature_c,
        humidity_percent: if monsoon { 85.0 } else { 60.0 },
        cloud_percent,
        condition,
        description: description.to_string(),
        wind_speed: 3.5,
        pressure_hpa: 1010.0,
        visibility_km: 10.0,
        icon: String::new(),
        sunrise: local_time_today(slot, offset, SUNRISE_HOUR, 0),
        sunset: local_time_today(slot, offset, SUNSET_HOUR, 0),
    }
}
