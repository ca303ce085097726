/// Daily roll-ups for reporting.
pub mod aggregate;
/// Slot clock for the hourly backfill.
pub mod clock;
pub mod engine;
/// Append-only history with FIFO retention.
pub mod history;
pub mod kpi;
pub mod power_balance;
/// Synthetic weather table for seeding.
pub mod seeder;
pub mod types;

pub use engine::{Engine, EngineSettings};
pub use history::HistoryStore;
pub use types::{EnergyLogRecord, TickOutcome};
