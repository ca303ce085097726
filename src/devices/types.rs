//! Shared numeric helpers for device models.

use rand::Rng;

/// Rounds `value` to `places` decimal places (half away from zero).
///
/// # Examples
///
/// ```
/// use renewable_sim::devices::types::round_to;
///
/// assert_eq!(round_to(8.4567, 2), 8.46);
/// assert_eq!(round_to(-1.25, 1), -1.3);
/// ```
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Draws a uniform sample from `[low, high]`.
///
/// Returns `low` for a degenerate or inverted range instead of panicking.
pub fn uniform<R: Rng>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high <= low {
        return low;
    }
    rng.random_range(low..=high)
}
