//! Scan loop cycles against in-memory collaborators

use crate::fakes::{QueuedCommands, RecordingSink, ScriptedSource};
use chrono::{DateTime, Duration, TimeZone, Utc};
use pumpwatch::config::Config;
use pumpwatch::scanner::{CycleOutcome, ScanLoop};
use pumpwatch::source::SourceError;
use rust_decimal_macros::dec;
use std::sync::Arc;

const CHAT: &str = "-1001";

struct Harness {
    source: Arc<ScriptedSource>,
    sink: Arc<RecordingSink>,
    commands: Arc<QueuedCommands>,
    scan: ScanLoop<ScriptedSource, RecordingSink, QueuedCommands>,
}

fn harness() -> Harness {
    let source = Arc::new(ScriptedSource::default());
    let sink = Arc::new(RecordingSink::default());
    let commands = Arc::new(QueuedCommands::default());
    let scan = ScanLoop::new(
        &Config::default(),
        CHAT,
        Arc::clone(&source),
        Arc::clone(&sink),
        Arc::clone(&commands),
    );
    Harness {
        source,
        sink,
        commands,
        scan,
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

fn completed(outcome: &CycleOutcome) -> &pumpwatch::scanner::CycleSummary {
    match outcome {
        CycleOutcome::Completed(summary) => summary,
        CycleOutcome::FetchFailed(e) => panic!("cycle failed: {e}"),
    }
}

#[tokio::test]
async fn test_announcement_goes_to_default_destination() {
    let h = harness();
    h.scan.announce().await;

    let sent = h.sink.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].0.starts_with("✅ Bot started · Top 200"));
    assert_eq!(sent[0].1, CHAT);
}

#[tokio::test]
async fn test_pump_is_delivered_once() {
    let mut h = harness();
    h.source.push(&[("XYZ", dec!(100)), ("BTC", dec!(42000))]);
    h.source.push(&[("XYZ", dec!(104)), ("BTC", dec!(42010))]);
    h.source.push(&[("XYZ", dec!(104.5)), ("BTC", dec!(42020))]);

    let first = h.scan.run_cycle(at(0)).await;
    assert_eq!(completed(&first).candidates, 0);
    assert_eq!(completed(&first).snapshot_size, 2);

    let second = h.scan.run_cycle(at(10)).await;
    assert_eq!(completed(&second).delivered, 1);
    assert_eq!(
        h.sink.sent(),
        vec![(
            "📈 PUMP XYZ +4.00% / 1m\nPrice: 104 USD".to_string(),
            CHAT.to_string()
        )]
    );

    // Still above threshold but inside the cooldown
    let third = h.scan.run_cycle(at(20)).await;
    assert_eq!(completed(&third).candidates, 1);
    assert_eq!(completed(&third).delivered, 0);
    assert_eq!(h.sink.sent().len(), 1);
}

#[tokio::test]
async fn test_alerts_delivered_largest_move_first() {
    let mut h = harness();
    h.source
        .push(&[("AAA", dec!(100)), ("BBB", dec!(100)), ("CCC", dec!(100))]);
    h.source
        .push(&[("AAA", dec!(105)), ("BBB", dec!(80)), ("CCC", dec!(112))]);

    h.scan.run_cycle(at(0)).await;
    let outcome = h.scan.run_cycle(at(30)).await;
    assert_eq!(completed(&outcome).delivered, 3);

    let texts = h.sink.texts();
    assert!(texts[0].contains("DUMP BBB -20.00% / 5m"));
    assert!(texts[1].contains("PUMP CCC +12.00% / 1m"));
    assert!(texts[2].contains("PUMP AAA +5.00% / 1m"));
}

#[tokio::test]
async fn test_fetch_failure_skips_detection_and_keeps_history() {
    let mut h = harness();
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push_err(SourceError::Http {
        status: 429,
        body: "rate limited".to_string(),
    });
    h.source.push(&[("XYZ", dec!(104))]);

    h.scan.run_cycle(at(0)).await;

    let failed = h.scan.run_cycle(at(10)).await;
    match &failed {
        CycleOutcome::FetchFailed(e) => assert!(e.is_http_status()),
        other => panic!("expected fetch failure, got {other:?}"),
    }
    assert_eq!(
        failed.next_delay(h.scan.settings(), std::time::Duration::ZERO),
        std::time::Duration::from_secs(5)
    );
    assert_eq!(h.scan.history().sample_count("XYZ"), 1);

    let recovered = h.scan.run_cycle(at(20)).await;
    assert_eq!(completed(&recovered).delivered, 1);
}

#[tokio::test]
async fn test_delivery_failure_still_starts_cooldown() {
    let mut h = harness();
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(110))]);
    h.source.push(&[("XYZ", dec!(110))]);
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(110))]);

    h.scan.run_cycle(at(0)).await;

    h.sink.set_failing(true);
    let failed = h.scan.run_cycle(at(10)).await;
    assert_eq!(completed(&failed).delivery_failures, 1);
    assert_eq!(h.scan.throttle().ledger().len(), 1);

    h.sink.set_failing(false);
    let suppressed = h.scan.run_cycle(at(20)).await;
    assert_eq!(completed(&suppressed).candidates, 1);
    assert_eq!(completed(&suppressed).delivered, 0);

    // Past the 600s cooldown, the next qualifying move goes through
    h.scan.run_cycle(at(620)).await;
    let after = h.scan.run_cycle(at(630)).await;
    assert_eq!(completed(&after).delivered, 1);
    assert_eq!(h.sink.sent().len(), 1);
}

#[tokio::test]
async fn test_status_command_answered_each_cycle() {
    let mut h = harness();
    h.commands.push("/status", "777");
    h.commands.push("hello", "888");
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(100))]);

    h.scan.run_cycle(at(0)).await;

    assert_eq!(
        h.sink.sent(),
        vec![(
            "Bot active ✅ (Top 200, +4%/1m, \u{2212}5%/5m)".to_string(),
            "777".to_string()
        )]
    );
    assert_eq!(h.scan.responder().cursor(), Some(2));

    h.commands.push("STATUS", "999");
    h.sink.clear();
    h.scan.run_cycle(at(10)).await;

    assert_eq!(h.commands.cursors(), vec![None, Some(2)]);
    assert_eq!(h.sink.sent().len(), 1);
    assert_eq!(h.sink.sent()[0].1, "999");
}

#[tokio::test]
async fn test_command_poll_failure_does_not_abort_cycle() {
    let mut h = harness();
    h.commands.set_failing(true);
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(95))]);

    h.scan.run_cycle(at(0)).await;
    let outcome = h.scan.run_cycle(at(120)).await;

    assert_eq!(completed(&outcome).delivered, 1);
    assert!(h.sink.texts()[0].starts_with("📉 DUMP XYZ -5.00% / 5m"));
    assert_eq!(h.scan.responder().cursor(), None);
}

#[tokio::test]
async fn test_symbol_missing_from_snapshot_keeps_history() {
    let mut h = harness();
    h.source.push(&[("XYZ", dec!(100)), ("GONE", dec!(10))]);
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(100)), ("GONE", dec!(10.5))]);

    h.scan.run_cycle(at(0)).await;
    h.scan.run_cycle(at(10)).await;
    assert_eq!(h.scan.history().sample_count("GONE"), 1);

    // Reappears within a minute at +5%
    let outcome = h.scan.run_cycle(at(20)).await;
    assert_eq!(completed(&outcome).delivered, 1);
    assert!(h.sink.texts()[0].contains("PUMP GONE +5.00% / 1m"));
}

#[tokio::test]
async fn test_clock_stepping_backwards_keeps_history_ordered() {
    let mut h = harness();
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(100))]);
    h.source.push(&[("XYZ", dec!(104))]);

    h.scan.run_cycle(at(0)).await;
    h.scan.run_cycle(at(60)).await;
    // Wall clock steps back 30s
    let outcome = h.scan.run_cycle(at(30)).await;

    let samples = h.scan.history().samples("XYZ").unwrap();
    assert_eq!(samples.len(), 3);
    assert!(samples
        .iter()
        .zip(samples.iter().skip(1))
        .all(|(a, b)| a.timestamp <= b.timestamp));
    assert_eq!(samples[2].timestamp, at(60));

    assert_eq!(completed(&outcome).delivered, 1);
    assert!(h.sink.texts()[0].contains("PUMP XYZ +4.00% / 1m"));
}
