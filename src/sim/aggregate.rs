//! Daily roll-ups over the stored energy history.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

use crate::devices::types::round_to;

use super::types::EnergyLogRecord;

/// Energy per calendar day, estimated as average power × 24 h.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Site-local calendar date.
    pub date: NaiveDate,
    /// Day of month, for chart labels.
    pub day: u32,
    /// Solar energy (kWh).
    pub solar: f64,
    /// Wind energy (kWh).
    pub wind: f64,
    /// Consumed energy (kWh).
    pub consumption: f64,
    /// `solar + wind` before rounding (kWh).
    pub total: f64,
}

#[derive(Default)]
struct DayAccumulator {
    solar: f64,
    wind: f64,
    consumption: f64,
    count: usize,
}

/// Groups records from the last `window_days` by local calendar day.
///
/// Only records with `now - window_days <= timestamp <= now` count. Days
/// without records are omitted rather than zero-filled. Output is sorted by
/// date.
pub fn daily_rollup<'a>(
    records: impl IntoIterator<Item = &'a EnergyLogRecord>,
    window_days: u32,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<DailySummary> {
    let start = now - Duration::days(i64::from(window_days));
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for r in records {
        if r.timestamp < start || r.timestamp > now {
            continue;
        }
        let date = r.timestamp.with_timezone(&offset).date_naive();
        let acc = days.entry(date).or_default();
        acc.solar += r.solar_kw;
        acc.wind += r.wind_kw;
        acc.consumption += r.consumption_kw;
        acc.count += 1;
    }

    days.into_iter()
        .map(|(date, acc)| {
            let n = acc.count as f64;
            let (solar, wind, consumption) =
                (acc.solar / n * 24.0, acc.wind / n * 24.0, acc.consumption / n * 24.0);
            DailySummary {
                date,
                day: date.day(),
                solar: round_to(solar, 2),
                wind: round_to(wind, 2),
                consumption: round_to(consumption, 2),
                total: round_to(solar + wind, 2),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::types::fixtures::record_at;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn averages_and_scales_per_day() {
        let records = vec![
            record_at(at(1, 10), 4.0, 1.0),
            record_at(at(1, 14), 2.0, 1.0),
            record_at(at(2, 9), 1.0, 0.5),
        ];
        let rollup = daily_rollup(&records, 30, at(3, 0), utc());

        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].day, 1);
        assert_eq!(rollup[0].solar, 72.0);
        assert_eq!(rollup[0].wind, 24.0);
        assert_eq!(rollup[0].consumption, 120.0);
        assert_eq!(rollup[0].total, 96.0);
        assert_eq!(rollup[1].date, NaiveDate::from_ymd_opt(2024, 4, 2).unwrap());
        assert_eq!(rollup[1].total, 36.0);
    }

    #[test]
    fn excludes_records_outside_window() {
        let records = vec![
            record_at(at(1, 10), 4.0, 1.0),
            record_at(at(20, 10), 4.0, 1.0),
            record_at(at(25, 10), 4.0, 1.0),
        ];
        let rollup = daily_rollup(&records, 7, at(22, 0), utc());
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].day, 20);
    }

    #[test]
    fn groups_by_local_day() {
        // 20:00 UTC on the 1st is 01:30 on the 2nd in IST
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        let records = vec![record_at(at(1, 20), 1.0, 1.0), record_at(at(2, 3), 1.0, 1.0)];
        let rollup = daily_rollup(&records, 30, at(3, 0), ist);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].day, 2);
    }

    #[test]
    fn empty_history_gives_empty_rollup() {
        assert!(daily_rollup(&[], 30, at(3, 0), utc()).is_empty());
    }
}
