//! Scan loop orchestrator
//!
//! One cycle: answer pending commands, fetch a snapshot, ingest it, detect,
//! throttle, deliver. History and the cooldown ledger are owned here and
//! only touched from the loop's own task.

use super::types::{CycleOutcome, CycleSummary, ScanSettings};
use crate::command::{CommandChannel, CommandResponder, PollOutcome};
use crate::config::Config;
use crate::detection::ChangeDetector;
use crate::history::HistoryStore;
use crate::notify::{announcement_text, format_alert, status_text, NotificationSink};
use crate::source::SnapshotSource;
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::throttle::AlertThrottle;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Fixed-period market scan loop
pub struct ScanLoop<S, N, C>
where
    S: SnapshotSource,
    N: NotificationSink,
    C: CommandChannel,
{
    source: Arc<S>,
    sink: Arc<N>,
    commands: Arc<C>,
    history: HistoryStore,
    detector: ChangeDetector,
    throttle: AlertThrottle,
    responder: CommandResponder,
    settings: ScanSettings,
    announcement: String,
}

impl<S, N, C> ScanLoop<S, N, C>
where
    S: SnapshotSource,
    N: NotificationSink,
    C: CommandChannel,
{
    /// Build a loop from configuration
    pub fn new(
        config: &Config,
        destination: impl Into<String>,
        source: Arc<S>,
        sink: Arc<N>,
        commands: Arc<C>,
    ) -> Self {
        Self {
            source,
            sink,
            commands,
            history: HistoryStore::new(config.scan.retention_secs),
            detector: ChangeDetector::new(config.detector.windows.clone()),
            throttle: AlertThrottle::new(config.scan.cooldown_secs),
            responder: CommandResponder::new(status_text(config)),
            settings: ScanSettings::from_config(config, destination),
            announcement: announcement_text(config),
        }
    }

    /// Send the startup announcement; failure is logged only
    pub async fn announce(&self) {
        match self
            .sink
            .deliver(&self.announcement, &self.settings.destination)
            .await
        {
            Ok(()) => tracing::info!("Startup announcement sent"),
            Err(e) => tracing::warn!(error = %e, "Startup announcement failed"),
        }
    }

    /// Run one cycle at `now`
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleOutcome {
        telemetry::increment(CounterMetric::Cycles);

        match self
            .responder
            .drain(self.commands.as_ref(), self.sink.as_ref())
            .await
        {
            PollOutcome::Handled { seen, replied } if seen > 0 => {
                tracing::debug!(seen, replied, "Commands handled");
            }
            PollOutcome::Handled { .. } | PollOutcome::Failed(_) => {}
        }

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot fetch failed, skipping cycle");
                telemetry::increment(CounterMetric::FetchFailures);
                return CycleOutcome::FetchFailed(e);
            }
        };

        let now = self.history.monotonic(now);
        self.history.ingest(now, &snapshot);
        telemetry::set_gauge(
            GaugeMetric::TrackedSymbols,
            self.history.symbol_count() as f64,
        );

        let candidates = self.detector.scan(&self.history, now);
        let candidate_count = candidates.len();
        telemetry::set_gauge(GaugeMetric::LastCandidates, candidate_count as f64);

        let surviving = self.throttle.filter_and_rank(candidates, now);

        let mut summary = CycleSummary {
            snapshot_size: snapshot.len(),
            candidates: candidate_count,
            ..Default::default()
        };

        for event in &surviving {
            let text = format_alert(event, &self.settings.quote_currency);
            match self.sink.deliver(&text, &self.settings.destination).await {
                Ok(()) => {
                    tracing::info!(
                        symbol = %event.symbol,
                        direction = %event.direction,
                        window_secs = event.window_secs,
                        pct_change = %event.pct_change.round_dp(2),
                        "Alert delivered"
                    );
                    telemetry::increment(CounterMetric::AlertsDelivered);
                    summary.delivered += 1;
                }
                Err(e) => {
                    // Cooldown mark stays in place
                    tracing::warn!(
                        error = %e,
                        symbol = %event.symbol,
                        direction = %event.direction,
                        "Alert delivery failed"
                    );
                    telemetry::increment(CounterMetric::DeliveryFailures);
                    summary.delivery_failures += 1;
                }
            }
        }

        tracing::info!(
            symbols = summary.snapshot_size,
            candidates = summary.candidates,
            delivered = summary.delivered,
            "Scan OK"
        );

        CycleOutcome::Completed(summary)
    }

    /// Optionally announce, then cycle until the task is dropped
    pub async fn run(mut self, announce: bool) -> anyhow::Result<()> {
        tracing::info!(
            period_secs = self.settings.period.as_secs(),
            windows = self.detector.rules().len(),
            cooldown_secs = self.throttle.cooldown_secs(),
            retention_secs = self.history.retention_secs(),
            "Starting scan loop"
        );

        if announce {
            self.announce().await;
        }

        loop {
            let started = Instant::now();
            let outcome = self.run_cycle(Utc::now()).await;
            let delay = outcome.next_delay(&self.settings, started.elapsed());
            tokio::time::sleep(delay).await;
        }
    }

    /// History owned by this loop
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Throttle owned by this loop
    pub fn throttle(&self) -> &AlertThrottle {
        &self.throttle
    }

    /// Command cursor state
    pub fn responder(&self) -> &CommandResponder {
        &self.responder
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }
}
