use chrono::{DateTime, Utc};
use rand::Rng;

use crate::devices::types::{round_to, uniform};
use crate::site::SiteConfig;
use crate::weather::{ConditionClass, WeatherSnapshot};

/// Fraction of irradiance that survives a fully overcast sky.
const CLOUD_ATTENUATION: f64 = 0.7;

/// Multiplicative output jitter applied to each solar reading.
pub const SOLAR_JITTER: (f64, f64) = (0.95, 1.05);

/// Irradiance multiplier for a weather condition.
pub fn condition_factor(condition: ConditionClass) -> f64 {
    match condition {
        ConditionClass::Rain | ConditionClass::Thunderstorm => 0.3,
        ConditionClass::Drizzle => 0.5,
        ConditionClass::Snow => 0.4,
        ConditionClass::Mist => 0.6,
        ConditionClass::Clear | ConditionClass::Clouds => 1.0,
    }
}

/// Sunlight availability in `[0, 1]` for `weather` at `now`.
///
/// Combines a half-sine daylight curve between sunrise and sunset (peak at
/// solar noon) with cloud cover and condition attenuation. Returns exactly
/// `0.0` outside `[sunrise, sunset)` or when the sun times are degenerate.
pub fn sunlight_factor(weather: &WeatherSnapshot, now: DateTime<Utc>) -> f64 {
    let day_ms = (weather.sunset - weather.sunrise).num_milliseconds();
    if day_ms <= 0 || now < weather.sunrise || now >= weather.sunset {
        return 0.0;
    }

    let progress = (now - weather.sunrise).num_milliseconds() as f64 / day_ms as f64;
    let time_factor = (progress * std::f64::consts::PI).sin();
    let cloud_factor = 1.0 - CLOUD_ATTENUATION * (weather.cloud_percent / 100.0);

    (time_factor * cloud_factor * condition_factor(weather.condition)).clamp(0.0, 1.0)
}

/// Solar array output (kW, two decimals, never negative).
pub fn solar_output_kw<R: Rng>(site: &SiteConfig, sunlight: f64, rng: &mut R) -> f64 {
    let jitter = uniform(rng, SOLAR_JITTER.0, SOLAR_JITTER.1);
    let kw = site.solar_capacity_kw * sunlight * site.panel_efficiency * jitter;
    round_to(kw, 2).max(0.0)
}
