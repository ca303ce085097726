//! Renewable-energy site simulator: solar, wind, battery and grid exchange
//! driven by live or synthetic weather, with a JSON dashboard API.

pub mod advice;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod devices;
pub mod forecast;
pub mod io;
/// Simulation engine, history store, seeding and aggregation.
pub mod sim;
pub mod site;
pub mod sizing;
pub mod telemetry;
pub mod weather;
