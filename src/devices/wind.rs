use rand::Rng;

use crate::devices::types::{round_to, uniform};

/// Rated output of the site's small turbine in kilowatts.
pub const TURBINE_RATED_KW: f64 = 5.0;

/// Capacity-factor bounds for a single wind reading.
pub const WIND_FACTOR: (f64, f64) = (0.1, 0.6);

/// Wind turbine output (kW, two decimals).
///
/// Independent of the weather snapshot and time of day: the turbine draws a
/// capacity factor uniformly from [`WIND_FACTOR`].
///
/// # Examples
///
/// ```
/// use rand::{SeedableRng, rngs::StdRng};
/// use renewable_sim::devices::wind::wind_output_kw;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let kw = wind_output_kw(&mut rng);
/// assert!((0.5..=3.0).contains(&kw));
/// ```
pub fn wind_output_kw<R: Rng>(rng: &mut R) -> f64 {
    round_to(TURBINE_RATED_KW * uniform(rng, WIND_FACTOR.0, WIND_FACTOR.1), 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn bounded_by_capacity_factor() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let kw = wind_output_kw(&mut rng);
            assert!((0.5..=3.0).contains(&kw), "got {kw}");
        }
    }

    #[test]
    fn deterministic_for_seed() {
        let a = wind_output_kw(&mut StdRng::seed_from_u64(5));
        let b = wind_output_kw(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
