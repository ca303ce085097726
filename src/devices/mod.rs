//! Generation, load and storage models for a single renewable site.

/// Battery state-of-charge ledger.
pub mod battery;
/// Combined solar + wind output for one step.
pub mod generation;
/// Household consumption model.
pub mod load;
/// Sunlight availability and photovoltaic output.
pub mod solar;
pub mod types;
/// Small wind turbine model.
pub mod wind;

// Re-export the main types for convenience
pub use battery::BatteryLedger;
pub use generation::{Generation, generate};
pub use solar::sunlight_factor;
