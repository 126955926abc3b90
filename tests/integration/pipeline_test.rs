//! History → detector → throttle without any I/O

use chrono::{DateTime, Duration, TimeZone, Utc};
use pumpwatch::detection::{ChangeDetector, Direction, WindowRule};
use pumpwatch::history::{HistoryStore, Snapshot};
use pumpwatch::throttle::AlertThrottle;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn snapshot(entries: &[(&str, Decimal)]) -> Snapshot {
    entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
}

#[test]
fn test_sparse_sampling_anchors_on_earliest_in_window_sample() {
    let mut history = HistoryStore::with_defaults();
    history.ingest(t0(), &snapshot(&[("XYZ", dec!(100))]));
    history.ingest(t0() + Duration::seconds(30), &snapshot(&[("XYZ", dec!(101))]));
    let now = t0() + Duration::seconds(65);
    history.ingest(now, &snapshot(&[("XYZ", dec!(104))]));

    assert_eq!(history.query_reference("XYZ", now, 60), Some(dec!(101)));

    // +2.97% against 101, short of the +4% pump rule
    let events = ChangeDetector::with_defaults().scan(&history, now);
    assert!(events.is_empty());
}

#[test]
fn test_steady_ticks_trigger_pump_then_cooldown() {
    let mut history = HistoryStore::with_defaults();
    let detector = ChangeDetector::with_defaults();
    let mut throttle = AlertThrottle::with_defaults();

    // 10s ticks, price flat then +5% jump
    let mut alerts = Vec::new();
    for i in 0..12 {
        let now = t0() + Duration::seconds(i * 10);
        let price = if i < 6 { dec!(100) } else { dec!(105) };
        history.ingest(now, &snapshot(&[("PUMPY", price)]));

        let surviving = throttle.filter_and_rank(detector.scan(&history, now), now);
        alerts.extend(surviving.into_iter().map(|e| (i, e)));
    }

    // The jump is visible in the 1m window from tick 6 through tick 11
    // but the cooldown lets only the first through
    assert_eq!(alerts.len(), 1);
    let (tick, event) = &alerts[0];
    assert_eq!(*tick, 6);
    assert_eq!(event.direction, Direction::Pump);
    assert_eq!(event.pct_change, dec!(5));
}

#[test]
fn test_slow_bleed_triggers_dump_on_five_minute_window() {
    let mut history = HistoryStore::with_defaults();
    let detector = ChangeDetector::with_defaults();

    // -1% per minute; 1m window never sees -5%, 5m window does at minute 5
    let mut price = dec!(100);
    let mut first_dump = None;
    for minute in 0..=6 {
        let now = t0() + Duration::seconds(minute * 60);
        history.ingest(now, &snapshot(&[("BLEED", price)]));

        let events = detector.scan(&history, now);
        assert!(events.iter().all(|e| e.window_secs == 300));
        if first_dump.is_none() && !events.is_empty() {
            first_dump = Some(minute);
        }
        price -= dec!(1);
    }

    assert_eq!(first_dump, Some(5));
}

#[test]
fn test_pump_and_dump_keys_coexist() {
    let mut history = HistoryStore::with_defaults();
    let detector = ChangeDetector::with_defaults();
    let mut throttle = AlertThrottle::with_defaults();

    // Crash over five minutes, then a sharp rebound in the last minute
    history.ingest(t0(), &snapshot(&[("WILD", dec!(100))]));
    history.ingest(t0() + Duration::seconds(250), &snapshot(&[("WILD", dec!(80))]));
    let now = t0() + Duration::seconds(300);
    history.ingest(now, &snapshot(&[("WILD", dec!(85))]));

    let surviving = throttle.filter_and_rank(detector.scan(&history, now), now);
    assert_eq!(surviving.len(), 2);

    // -15% outranks +6.25%
    assert_eq!(surviving[0].direction, Direction::Dump);
    assert_eq!(surviving[0].window_secs, 300);
    assert_eq!(surviving[0].pct_change, dec!(-15));
    assert_eq!(surviving[1].direction, Direction::Pump);
    assert_eq!(surviving[1].window_secs, 60);
    assert_eq!(surviving[1].pct_change, dec!(6.25));
}

#[test]
fn test_disabled_window_is_silent_under_extreme_moves() {
    let mut history = HistoryStore::with_defaults();
    let detector = ChangeDetector::new(vec![WindowRule::disabled(900)]);

    for i in 0..20 {
        let now = t0() + Duration::seconds(i * 45);
        let price = if i % 2 == 0 { dec!(1) } else { dec!(1000) };
        history.ingest(now, &snapshot(&[("CHAOS", price)]));
        assert!(detector.scan(&history, now).is_empty());
    }
}

#[test]
fn test_retention_invariant_across_many_ingests() {
    let mut history = HistoryStore::new(1200);

    for i in 0..400 {
        let now = t0() + Duration::seconds(i * 10);
        let mut entries = vec![("BTC", dec!(42000))];
        if i % 3 == 0 {
            entries.push(("ETH", dec!(2500)));
        }
        history.ingest(now, &snapshot(&entries));

        let cutoff = now - Duration::seconds(1200);
        assert!(history
            .samples("BTC")
            .unwrap()
            .iter()
            .all(|s| s.timestamp >= cutoff));
        if i % 3 == 0 {
            assert!(history
                .samples("ETH")
                .unwrap()
                .iter()
                .all(|s| s.timestamp >= cutoff));
        }
    }

    assert_eq!(history.sample_count("BTC"), 121);
}
