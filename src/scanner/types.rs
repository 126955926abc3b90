//! Scan loop types

use crate::config::Config;
use crate::source::SourceError;
use std::time::Duration;

/// Timing and addressing for the scan loop
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Target time between cycle starts
    pub period: Duration,
    /// Delay after the listings API answered with an error status
    pub http_error_delay: Duration,
    /// Delay after any other failed cycle
    pub error_delay: Duration,
    /// Quote currency shown in alerts
    pub quote_currency: String,
    /// Default destination for alerts and the startup announcement
    pub destination: String,
}

impl ScanSettings {
    pub fn from_config(config: &Config, destination: impl Into<String>) -> Self {
        Self {
            period: Duration::from_secs(config.scan.period_secs),
            http_error_delay: Duration::from_secs(config.scan.http_error_delay_secs),
            error_delay: Duration::from_secs(config.scan.error_delay_secs),
            quote_currency: config.source.quote_currency.to_uppercase(),
            destination: destination.into(),
        }
    }
}

/// Counters for one completed cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// Symbols in the fetched snapshot
    pub snapshot_size: usize,
    /// Candidates produced by the detector
    pub candidates: usize,
    /// Alerts delivered
    pub delivered: usize,
    /// Alerts whose delivery failed (cooldown still started)
    pub delivery_failures: usize,
}

impl CycleSummary {
    /// Alerts that survived the throttle
    pub fn surviving(&self) -> usize {
        self.delivered + self.delivery_failures
    }
}

/// How a cycle ended
#[derive(Debug)]
pub enum CycleOutcome {
    /// Snapshot ingested and evaluated
    Completed(CycleSummary),
    /// Snapshot fetch failed; detection was skipped
    FetchFailed(SourceError),
}

impl CycleOutcome {
    /// Time to wait before the next cycle, given how long this one took
    pub fn next_delay(&self, settings: &ScanSettings, elapsed: Duration) -> Duration {
        match self {
            CycleOutcome::Completed(_) => settings.period.saturating_sub(elapsed),
            CycleOutcome::FetchFailed(e) if e.is_http_status() => settings.http_error_delay,
            CycleOutcome::FetchFailed(_) => settings.error_delay,
        }
    }
}
