//! Append-only energy history with FIFO retention.

use std::collections::VecDeque;

use super::types::EnergyLogRecord;

/// Default number of records kept before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Bounded, insertion-ordered store of [`EnergyLogRecord`]s.
///
/// # Examples
///
/// ```
/// use renewable_sim::sim::history::HistoryStore;
///
/// let history = HistoryStore::new(3);
/// assert!(history.is_empty());
/// assert_eq!(history.capacity(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct HistoryStore {
    records: VecDeque<EnergyLogRecord>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl HistoryStore {
    /// Creates an empty store; a zero `capacity` is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// Appends a record, evicting from the front once over capacity.
    pub fn push(&mut self, record: EnergyLogRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            self.records.pop_front();
        }
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = EnergyLogRecord>) {
        for record in records {
            self.push(record);
        }
    }

    /// The last `n` records, oldest first.
    pub fn recent(&self, n: usize) -> Vec<EnergyLogRecord> {
        let skip = self.records.len().saturating_sub(n);
        self.records.iter().skip(skip).cloned().collect()
    }

    /// Most recently appended record.
    pub fn last(&self) -> Option<&EnergyLogRecord> {
        self.records.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnergyLogRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
