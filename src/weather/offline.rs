use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use tracing::debug;

use super::{WeatherProvider, WeatherReport, fallback_snapshot};

/// Provider that never touches the network.
///
/// Serves the time-of-day table as if it were live data, for demos and
/// air-gapped runs.
#[derive(Debug, Clone, Copy)]
pub struct OfflineWeather {
    offset: FixedOffset,
}

impl OfflineWeather {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

#[async_trait]
impl WeatherProvider for OfflineWeather {
    async fn fetch(&self, city: &str, now: DateTime<Utc>) -> WeatherReport {
        debug!(city, "serving offline weather");
        WeatherReport::live(fallback_snapshot(city, now, self.offset))
    }
}
