/// CSV export of the energy history.
pub mod export;
