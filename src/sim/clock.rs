use chrono::{DateTime, Duration, Utc};

/// A clock that walks fixed-width time slots from a start instant.
///
/// Used by the history seeder to visit every hourly slot of the backfill
/// window in order.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use renewable_sim::sim::clock::SlotClock;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut clock = SlotClock::new(start, Duration::hours(1), 3);
/// let mut hours = Vec::new();
///
/// while let Some(t) = clock.tick() {
///     hours.push(t);
/// }
/// assert_eq!(hours.len(), 3);
/// assert_eq!(hours[2], start + Duration::hours(2));
/// ```
pub struct SlotClock {
    start: DateTime<Utc>,
    width: Duration,
    /// Next slot index
    current: usize,
    /// Total slots to visit
    total: usize,
}

impl SlotClock {
    /// Creates a clock that yields `total` slots of `width` starting at `start`.
    pub fn new(start: DateTime<Utc>, width: Duration, total: usize) -> Self {
        Self {
            start,
            width,
            current: 0,
            total,
        }
    }

    /// Hourly slots covering `days` whole days that end at `end`.
    ///
    /// Returns `None` when the window would start before the earliest
    /// representable instant.
    pub fn hourly_backfill(end: DateTime<Utc>, days: u32) -> Option<Self> {
        let start = end.checked_sub_signed(Duration::days(i64::from(days)))?;
        Some(Self::new(start, Duration::hours(1), days as usize * 24))
    }

    /// Advances the clock by one slot.
    ///
    /// # Returns
    ///
    /// * `Some(instant)` - Start of the slot before advancing
    /// * `None` - If every slot has been visited
    pub fn tick(&mut self) -> Option<DateTime<Utc>> {
        if self.current < self.total {
            let at = self.start + self.width * self.current as i32;
            self.current += 1;
            Some(at)
        } else {
            None
        }
    }

    /// Slots left to visit.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }
}
