//! Per-symbol rolling sample store

use super::types::{bounded_seconds, Sample, Snapshot};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Default retention: 20 minutes
pub const DEFAULT_RETENTION_SECS: u64 = 20 * 60;

/// Rolling price history for every symbol seen so far
///
/// Samples are appended in time order, so each sequence stays sorted by
/// timestamp. After every ingest, touched sequences hold no sample older
/// than `now - retention`. Ingest times never go backwards: a `now` earlier
/// than the previous ingest is clamped to it. Symbols missing from a snapshot keep whatever
/// history they had; they are only trimmed the next time they reappear.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    series: HashMap<String, VecDeque<Sample>>,
    retention: Duration,
    last_ingest: Option<DateTime<Utc>>,
}

impl HistoryStore {
    /// Create an empty store with the given retention
    pub fn new(retention_secs: u64) -> Self {
        Self {
            series: HashMap::new(),
            retention: bounded_seconds(retention_secs),
            last_ingest: None,
        }
    }

    /// Create a store with the default 20 minute retention
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_RETENTION_SECS)
    }

    /// Append one sample per snapshot entry, then evict expired samples
    ///
    /// Prices are stored as given. Non-positive prices are the source's
    /// responsibility; the detector treats them as an undefined reference.
    pub fn ingest(&mut self, now: DateTime<Utc>, snapshot: &Snapshot) {
        let now = self.monotonic(now);
        self.last_ingest = Some(now);
        let cutoff = now - self.retention;

        for (symbol, price) in snapshot {
            let samples = self.series.entry(symbol.to_uppercase()).or_default();
            samples.push_back(Sample::new(now, *price));

            while let Some(front) = samples.front() {
                if front.timestamp < cutoff {
                    samples.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    /// Price of the earliest sample with `timestamp >= now - window_secs`
    ///
    /// Returns `None` when the symbol is unknown or has nothing inside the
    /// window. The anchor is the oldest in-window sample, not the one
    /// nearest the window boundary, so sparse sampling shortens the
    /// effective window instead of interpolating.
    pub fn query_reference(
        &self,
        symbol: &str,
        now: DateTime<Utc>,
        window_secs: u64,
    ) -> Option<Decimal> {
        let samples = self.series.get(&symbol.to_uppercase())?;
        let cutoff = now - bounded_seconds(window_secs);

        // Timestamps are non-decreasing, so the in-window suffix starts here
        let idx = samples.partition_point(|s| s.timestamp < cutoff);
        samples.get(idx).map(|s| s.price)
    }

    /// `now`, or the previous ingest time if the clock stepped backwards
    pub fn monotonic(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.last_ingest {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    /// Most recent sample for a symbol
    pub fn latest(&self, symbol: &str) -> Option<&Sample> {
        self.series.get(&symbol.to_uppercase())?.back()
    }

    /// All retained samples for a symbol, oldest first
    pub fn samples(&self, symbol: &str) -> Option<&VecDeque<Sample>> {
        self.series.get(&symbol.to_uppercase())
    }

    /// Iterate over (symbol, samples) pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VecDeque<Sample>)> {
        self.series.iter()
    }

    /// Number of symbols with history
    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    /// Number of samples held for a symbol
    pub fn sample_count(&self, symbol: &str) -> usize {
        self.samples(symbol).map_or(0, VecDeque::len)
    }

    /// Retention window in seconds
    pub fn retention_secs(&self) -> u64 {
        self.retention.num_seconds() as u64
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.series.clear();
        self.last_ingest = None;
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
