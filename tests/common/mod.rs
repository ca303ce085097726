//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use renewable_sim::sim::{Engine, EngineSettings};
use renewable_sim::weather::{
    ConditionClass, WeatherError, WeatherProvider, WeatherReport, WeatherSnapshot,
    fallback_snapshot,
};

/// India Standard Time, the default site offset.
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap()
}

/// 2024-03-10 12:00 site-local time.
pub fn local_noon() -> DateTime<Utc> {
    ist()
        .with_ymd_and_hms(2024, 3, 10, 12, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// Clear, warm weather with the sun up six hours either side of `now`.
pub fn clear_weather(now: DateTime<Utc>) -> WeatherSnapshot {
    WeatherSnapshot {
        city: "Mumbai".to_string(),
        temperature_c: 31.0,
        feels_like_c: 34.0,
        humidity_percent: 60.0,
        cloud_percent: 0.0,
        condition: ConditionClass::Clear,
        description: "clear sky".to_string(),
        wind_speed: 4.0,
        pressure_hpa: 1010.0,
        visibility_km: 10.0,
        icon: "01d".to_string(),
        sunrise: now - Duration::hours(6),
        sunset: now + Duration::hours(6),
    }
}

/// Seeded engine with default settings and the default retention.
pub fn engine_with_seed(seed: u64) -> Engine<StdRng> {
    Engine::new(EngineSettings::default(), 1000, StdRng::seed_from_u64(seed))
}

/// Provider that always reports the same live weather.
pub struct StaticWeather;

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport {
        let mut snapshot = clear_weather(now);
        snapshot.city = city.to_string();
        WeatherReport::live(snapshot)
    }
}

/// Provider whose lookups always fail over to the time-of-day table.
pub struct UnreachableWeather;

#[async_trait]
impl WeatherProvider for UnreachableWeather {
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport {
        WeatherReport::fallback(
            fallback_snapshot(city, now, ist()),
            WeatherError::CityNotFound(city.to_string()),
        )
    }
}

/// Provider that sleeps for the given duration before answering.
pub struct SlowWeather(pub std::time::Duration);

#[async_trait]
impl WeatherProvider for SlowWeather {
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport {
        tokio::time::sleep(self.0).await;
        StaticWeather.fetch(city, now).await
    }
}
