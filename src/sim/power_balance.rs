//! Grid exchange at the battery's extremes.

use crate::devices::types::round_to;

/// Below this charge (percent) a deficit is imported from the grid.
pub const IMPORT_BELOW_PERCENT: f64 = 5.0;
/// Above this charge (percent) a surplus is exported to the grid.
pub const EXPORT_ABOVE_PERCENT: f64 = 95.0;

/// Power exchanged with the grid during one step (both kW, >= 0).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridExchange {
    pub import_kw: f64,
    pub export_kw: f64,
}

/// Decides grid import/export for a step.
///
/// The battery buffers any mismatch while its charge is mid-range; the grid
/// is used only when the battery is nearly empty (import) or nearly full
/// (export). At most one direction is non-zero.
///
/// # Arguments
///
/// * `total_generation_kw` - Solar plus wind output
/// * `consumption_kw` - Site load
/// * `battery_percent` - Charge after the step, unrounded
///
/// # Examples
///
/// ```
/// use renewable_sim::sim::power_balance::grid_exchange;
///
/// let g = grid_exchange(1.0, 4.0, 3.0);
/// assert_eq!(g.import_kw, 3.0);
/// assert_eq!(g.export_kw, 0.0);
///
/// // mid-range battery absorbs the deficit
/// assert_eq!(grid_exchange(1.0, 4.0, 50.0).import_kw, 0.0);
/// ```
pub fn grid_exchange(
    total_generation_kw: f64,
    consumption_kw: f64,
    battery_percent: f64,
) -> GridExchange {
    let import_kw = if total_generation_kw < consumption_kw && battery_percent < IMPORT_BELOW_PERCENT
    {
        round_to(consumption_kw - total_generation_kw, 2)
    } else {
        0.0
    };
    let export_kw = if total_generation_kw > consumption_kw && battery_percent > EXPORT_ABOVE_PERCENT
    {
        round_to(total_generation_kw - consumption_kw, 2)
    } else {
        0.0
    };
    GridExchange {
        import_kw,
        export_kw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_battery_imports_deficit() {
        let g = grid_exchange(2.0, 5.5, 0.0);
        assert_eq!(g.import_kw, 3.5);
        assert_eq!(g.export_kw, 0.0);
    }

    #[test]
    fn full_battery_exports_surplus() {
        let g = grid_exchange(9.0, 4.25, 100.0);
        assert_eq!(g.import_kw, 0.0);
        assert_eq!(g.export_kw, 4.75);
    }

    #[test]
    fn thresholds_are_strict() {
        assert_eq!(grid_exchange(1.0, 2.0, 5.0).import_kw, 0.0);
        assert_eq!(grid_exchange(2.0, 1.0, 95.0).export_kw, 0.0);
    }

    #[test]
    fn balanced_step_uses_no_grid() {
        assert_eq!(grid_exchange(3.0, 3.0, 0.0), GridExchange::default());
        assert_eq!(grid_exchange(3.0, 3.0, 100.0), GridExchange::default());
    }

    proptest! {
        #[test]
        fn import_and_export_are_exclusive(
            total in 0.0f64..50.0,
            consumption in 0.0f64..50.0,
            battery in 0.0f64..=100.0,
        ) {
            let g = grid_exchange(total, consumption, battery);
            prop_assert!(g.import_kw >= 0.0 && g.export_kw >= 0.0);
            prop_assert!(g.import_kw == 0.0 || g.export_kw == 0.0);
            prop_assert_eq!(
                g.import_kw > 0.0,
                total < consumption && battery < IMPORT_BELOW_PERCENT
                    && round_to(consumption - total, 2) > 0.0
            );
            prop_assert_eq!(
                g.export_kw > 0.0,
                total > consumption && battery > EXPORT_ABOVE_PERCENT
                    && round_to(total - consumption, 2) > 0.0
            );
        }
    }
}
