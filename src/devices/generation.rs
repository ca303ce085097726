use rand::Rng;
use serde::Serialize;

use crate::devices::solar::solar_output_kw;
use crate::devices::types::round_to;
use crate::devices::wind::wind_output_kw;
use crate::site::SiteConfig;

/// Output of the site's generators for one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Generation {
    pub solar_kw: f64,
    pub wind_kw: f64,
}

impl Generation {
    /// Combined output, rounded to two decimals.
    pub fn total_kw(&self) -> f64 {
        round_to(self.solar_kw + self.wind_kw, 2)
    }
}

/// Computes solar and wind output for one step.
///
/// Solar is drawn before wind so a seeded `rng` yields a stable sequence.
pub fn generate<R: Rng>(site: &SiteConfig, sunlight: f64, rng: &mut R) -> Generation {
    let solar_kw = solar_output_kw(site, sunlight, rng);
    let wind_kw = wind_output_kw(rng);
    Generation { solar_kw, wind_kw }
}
