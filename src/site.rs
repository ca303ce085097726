//! Mutable site parameters and the store that owns them.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Physical parameters of the single simulated site.
///
/// Shared by the engine, the seeder and the reporting endpoints. All numeric
/// fields are validated positive by [`SiteConfig::validate`] before they can
/// reach a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// City used for the weather lookup.
    pub city: String,
    /// Nameplate PV capacity (kW).
    pub solar_capacity_kw: f64,
    /// Usable battery capacity (kWh, must be > 0).
    pub battery_size_kwh: f64,
    /// Panel conversion efficiency in (0, 1].
    pub panel_efficiency: f64,
    /// Average household draw (kW).
    pub consumption_base_kw: f64,
    /// Upstream weather API key, kept for clients that store one.
    pub weather_api_key: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            city: "Mumbai".to_string(),
            solar_capacity_kw: 10.0,
            battery_size_kwh: 10.0,
            panel_efficiency: 0.85,
            consumption_base_kw: 5.0,
            weather_api_key: None,
        }
    }
}

fn positive(field: &str, value: f64, errors: &mut Vec<ConfigError>) {
    if !(value > 0.0 && value.is_finite()) {
        errors.push(ConfigError::new(field, format!("must be > 0, got {value}")));
    }
}

impl SiteConfig {
    /// Validates all fields and returns a list of errors (empty when valid).
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.city.trim().is_empty() {
            errors.push(ConfigError::new("city", "must not be empty"));
        }
        positive("solar_capacity_kw", self.solar_capacity_kw, &mut errors);
        positive("battery_size_kwh", self.battery_size_kwh, &mut errors);
        positive("consumption_base_kw", self.consumption_base_kw, &mut errors);
        if !(self.panel_efficiency > 0.0 && self.panel_efficiency <= 1.0) {
            errors.push(ConfigError::new(
                "panel_efficiency",
                format!("must be in (0, 1], got {}", self.panel_efficiency),
            ));
        }
        errors
    }

    /// Returns a copy with `update` applied; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns every violated constraint of the merged configuration.
    pub fn merged(&self, update: &SiteConfigUpdate) -> Result<Self, Vec<ConfigError>> {
        let mut next = self.clone();
        if let Some(city) = &update.city {
            next.city = city.trim().to_string();
        }
        if let Some(v) = update.solar_capacity {
            next.solar_capacity_kw = v;
        }
        if let Some(v) = update.battery_size {
            next.battery_size_kwh = v;
        }
        if let Some(v) = update.panel_efficiency {
            next.panel_efficiency = v;
        }
        if let Some(v) = update.consumption_base {
            next.consumption_base_kw = v;
        }
        if let Some(key) = &update.weather_api_key {
            next.weather_api_key = (!key.is_empty()).then(|| key.clone());
        }

        let errors = next.validate();
        if errors.is_empty() { Ok(next) } else { Err(errors) }
    }
}

/// Partial update: only provided fields change.
///
/// Field names follow the dashboard's JSON contract.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfigUpdate {
    pub city: Option<String>,
    pub solar_capacity: Option<f64>,
    pub battery_size: Option<f64>,
    pub panel_efficiency: Option<f64>,
    pub consumption_base: Option<f64>,
    pub weather_api_key: Option<String>,
}

/// Read/write access to the site configuration.
pub trait ConfigStore: Send + Sync {
    /// Returns a snapshot of the current configuration.
    fn get(&self) -> SiteConfig;

    /// Applies a partial update atomically.
    ///
    /// # Errors
    ///
    /// Returns the violated constraints; the stored configuration is unchanged.
    fn update(&self, update: &SiteConfigUpdate) -> Result<SiteConfig, Vec<ConfigError>>;
}

/// Process-local configuration store.
#[derive(Debug, Default)]
pub struct InMemoryConfigStore {
    inner: RwLock<SiteConfig>,
}

impl InMemoryConfigStore {
    pub fn new(initial: SiteConfig) -> Self {
        Self {
            inner: RwLock::new(initial),
        }
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self) -> SiteConfig {
        self.inner.read().clone()
    }

    fn update(&self, update: &SiteConfigUpdate) -> Result<SiteConfig, Vec<ConfigError>> {
        let mut guard = self.inner.write();
        let next = guard.merged(update)?;
        *guard = next.clone();
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_site_valid() {
        assert!(SiteConfig::default().validate().is_empty());
    }

    #[test]
    fn partial_update_only_changes_given_fields() {
        let store = InMemoryConfigStore::new(SiteConfig::default());
        let update = SiteConfigUpdate {
            city: Some("Delhi".to_string()),
            battery_size: Some(20.0),
            ..SiteConfigUpdate::default()
        };
        let next = store.update(&update);
        assert!(next.is_ok());

        let cfg = store.get();
        assert_eq!(cfg.city, "Delhi");
        assert_eq!(cfg.battery_size_kwh, 20.0);
        assert_eq!(cfg.solar_capacity_kw, 10.0);
        assert_eq!(cfg.panel_efficiency, 0.85);
    }

    #[test]
    fn invalid_update_leaves_store_unchanged() {
        let store = InMemoryConfigStore::new(SiteConfig::default());
        let update = SiteConfigUpdate {
            city: Some("Delhi".to_string()),
            battery_size: Some(0.0),
            ..SiteConfigUpdate::default()
        };
        let errors = store.update(&update).err().unwrap_or_default();
        assert!(errors.iter().any(|e| e.field == "battery_size_kwh"));
        assert_eq!(store.get(), SiteConfig::default());
    }

    #[test]
    fn rejects_negative_capacity_and_bad_efficiency() {
        let site = SiteConfig {
            solar_capacity_kw: -1.0,
            panel_efficiency: 1.5,
            ..SiteConfig::default()
        };
        let errors = site.validate();
        assert!(errors.iter().any(|e| e.field == "solar_capacity_kw"));
        assert!(errors.iter().any(|e| e.field == "panel_efficiency"));
    }

    #[test]
    fn rejects_nan_battery() {
        let site = SiteConfig {
            battery_size_kwh: f64::NAN,
            ..SiteConfig::default()
        };
        assert!(site.validate().iter().any(|e| e.field == "battery_size_kwh"));
    }

    #[test]
    fn empty_api_key_clears_stored_key() {
        let site = SiteConfig {
            weather_api_key: Some("abc".to_string()),
            ..SiteConfig::default()
        };
        let update = SiteConfigUpdate {
            weather_api_key: Some(String::new()),
            ..SiteConfigUpdate::default()
        };
        let next = site.merged(&update).ok();
        assert_eq!(next.and_then(|s| s.weather_api_key), None);
    }
}
