//! Integration tests for live ticking, history seeding and retention.

mod common;

use chrono::{Duration, Timelike};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use renewable_sim::io::export::write_csv;
use renewable_sim::sim::aggregate::daily_rollup;
use renewable_sim::sim::kpi::HistoryKpis;
use renewable_sim::sim::{Engine, EngineSettings};
use renewable_sim::site::SiteConfig;

#[test]
fn retention_keeps_newest_thousand_records() {
    let mut engine = common::engine_with_seed(1);
    let site = SiteConfig::default();
    let t0 = common::local_noon();

    for i in 0..1005 {
        let now = t0 + Duration::seconds(i);
        engine
            .tick(&site, &common::clear_weather(now), now)
            .expect("default site is valid");
    }

    let history = engine.history();
    assert_eq!(history.len(), 1000);
    let first = history.iter().next().map(|r| r.timestamp);
    assert_eq!(first, Some(t0 + Duration::seconds(5)));
    assert_eq!(
        history.last().map(|r| r.timestamp),
        Some(t0 + Duration::seconds(1004))
    );
}

#[test]
fn seeding_is_idempotent_and_ticks_append() {
    let mut engine = common::engine_with_seed(2);
    let site = SiteConfig::default();
    let now = common::local_noon();

    assert_eq!(engine.seed_history(&site, 30, now).unwrap(), 720);
    assert_eq!(engine.seed_history(&site, 30, now).unwrap(), 0);
    assert_eq!(engine.history().len(), 720);

    let later = now + Duration::minutes(5);
    engine
        .tick(&site, &common::clear_weather(later), later)
        .unwrap();
    assert_eq!(engine.history().len(), 721);
    assert_eq!(engine.history().last().map(|r| r.timestamp), Some(later));
}

#[test]
fn seeded_history_has_no_solar_at_night() {
    let mut engine = common::engine_with_seed(3);
    let now = common::local_noon();
    engine
        .seed_history(&SiteConfig::default(), 30, now)
        .unwrap();

    for r in engine.history().iter() {
        let hour = r.timestamp.with_timezone(&common::ist()).hour();
        if !(6..18).contains(&hour) {
            assert_eq!(r.solar_kw, 0.0, "solar at local hour {hour}");
        }
        assert!(r.wind_kw >= 0.0);
        assert!((0.0..=100.0).contains(&r.battery_percent));
    }
}

#[test]
fn monthly_rollup_over_seeded_history() {
    let mut engine = common::engine_with_seed(4);
    let now = common::local_noon();
    engine
        .seed_history(&SiteConfig::default(), 30, now)
        .unwrap();

    let days = daily_rollup(engine.history().iter(), 30, now, common::ist());
    assert!((30..=31).contains(&days.len()), "got {} days", days.len());
    assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    for d in &days {
        assert!(d.consumption > 0.0);
        assert!((d.total - (d.solar + d.wind)).abs() < 0.011);
    }
}

#[test]
fn seeded_history_exports_and_summarizes() {
    let mut engine = common::engine_with_seed(5);
    engine
        .seed_history(&SiteConfig::default(), 2, common::local_noon())
        .unwrap();

    let mut buf = Vec::new();
    write_csv(engine.history().iter(), &mut buf).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    assert_eq!(csv.lines().count(), 49);
    assert!(csv.starts_with("timestamp,solar_kw,wind_kw"));

    let kpis = HistoryKpis::from_records(engine.history().iter());
    assert_eq!(kpis.records, 48);
    assert!(kpis.min_battery_percent <= kpis.max_battery_percent);
}

#[test]
fn resumed_engine_continues_from_last_battery_level() {
    let mut engine = common::engine_with_seed(6);
    let now = common::local_noon();
    engine
        .seed_history(&SiteConfig::default(), 1, now)
        .unwrap();
    let last = engine.history().last().map(|r| r.battery_percent).unwrap();

    let resumed = Engine::with_history(
        EngineSettings::default(),
        engine.history().clone(),
        StdRng::seed_from_u64(7),
    );
    assert_eq!(resumed.battery_percent(), last);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn live_ticks_respect_balance_rules(
        seed in any::<u64>(),
        solar_capacity_kw in 0.5f64..20.0,
        battery_size_kwh in 0.5f64..30.0,
        consumption_base_kw in 0.5f64..8.0,
        panel_efficiency in 0.5f64..1.0,
    ) {
        let site = SiteConfig {
            solar_capacity_kw,
            battery_size_kwh,
            consumption_base_kw,
            panel_efficiency,
            ..SiteConfig::default()
        };
        let settings = EngineSettings { live_tick_hours: 1.0, ..EngineSettings::default() };
        let mut engine = Engine::new(settings, 100, StdRng::seed_from_u64(seed));
        let t0 = common::local_noon();

        for i in 0..40 {
            let now = t0 + Duration::seconds(i);
            let r = engine.tick(&site, &common::clear_weather(now), now).unwrap().record;

            prop_assert!((r.total_generation_kw - (r.solar_kw + r.wind_kw)).abs() < 0.011);
            prop_assert!((0.0..=100.0).contains(&r.battery_percent));
            prop_assert!(r.grid_import_kw == 0.0 || r.grid_export_kw == 0.0);
            if r.grid_import_kw > 0.0 {
                prop_assert!(r.battery_percent <= 5.0);
                prop_assert!(r.total_generation_kw < r.consumption_kw);
            }
            if r.grid_export_kw > 0.0 {
                prop_assert!(r.battery_percent >= 95.0);
                prop_assert!(r.total_generation_kw > r.consumption_kw);
            }
        }
    }
}
