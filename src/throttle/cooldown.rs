//! Cooldown ledger and throttle

use crate::detection::{CandidateEvent, Direction};
use crate::history::bounded_seconds;
use crate::telemetry::{self, CounterMetric};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Default cooldown: 10 minutes
pub const DEFAULT_COOLDOWN_SECS: u64 = 10 * 60;

/// Identity of "the same alert" for cooldown purposes
///
/// Different windows or directions for one symbol are different keys, so a
/// 1m pump and a 5m dump can be live at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub symbol: String,
    pub window_secs: u64,
    pub direction: Direction,
}

impl From<&CandidateEvent> for AlertKey {
    fn from(event: &CandidateEvent) -> Self {
        Self {
            symbol: event.symbol.clone(),
            window_secs: event.window_secs,
            direction: event.direction,
        }
    }
}

/// Last-fired time per alert key
///
/// Entries are written only when an alert survives the throttle and are
/// never expired; staleness is judged at lookup time.
#[derive(Debug, Clone, Default)]
pub struct CooldownLedger {
    last_fired: HashMap<AlertKey, DateTime<Utc>>,
}

impl CooldownLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// When this key last fired, if ever
    pub fn last_fired(&self, key: &AlertKey) -> Option<DateTime<Utc>> {
        self.last_fired.get(key).copied()
    }

    /// Record a firing at `now`
    pub fn mark_fired(&mut self, key: AlertKey, now: DateTime<Utc>) {
        self.last_fired.insert(key, now);
    }

    /// Whether `key` fired less than `cooldown` before `now`
    pub fn is_cooling_down(
        &self,
        key: &AlertKey,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> bool {
        match self.last_fired(key) {
            Some(fired_at) => now - fired_at < cooldown,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.last_fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_fired.is_empty()
    }
}

/// Sort candidates by absolute percent change, largest first
///
/// Ties fall back to symbol, window and direction so the order does not
/// depend on hash map iteration.
pub fn rank_by_magnitude(candidates: &mut [CandidateEvent]) {
    candidates.sort_by(|a, b| {
        b.magnitude()
            .cmp(&a.magnitude())
            .then_with(|| a.symbol.cmp(&b.symbol))
            .then_with(|| a.window_secs.cmp(&b.window_secs))
            .then_with(|| a.direction.cmp(&b.direction))
    });
}

/// Ranks candidates and applies the cooldown
pub struct AlertThrottle {
    ledger: CooldownLedger,
    cooldown: Duration,
}

impl AlertThrottle {
    /// Create a throttle with an empty ledger
    pub fn new(cooldown_secs: u64) -> Self {
        Self::with_ledger(CooldownLedger::new(), cooldown_secs)
    }

    /// Create a throttle over an existing ledger
    pub fn with_ledger(ledger: CooldownLedger, cooldown_secs: u64) -> Self {
        Self {
            ledger,
            cooldown: bounded_seconds(cooldown_secs),
        }
    }

    /// Throttle with the default 10 minute cooldown
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_COOLDOWN_SECS)
    }

    /// Rank candidates and drop those still cooling down
    ///
    /// Survivors are marked fired immediately, before any delivery attempt,
    /// so a failed delivery still starts the cooldown. A second candidate
    /// with the same key in one batch is dropped by the first one's mark.
    pub fn filter_and_rank(
        &mut self,
        mut candidates: Vec<CandidateEvent>,
        now: DateTime<Utc>,
    ) -> Vec<CandidateEvent> {
        rank_by_magnitude(&mut candidates);

        let mut surviving = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let key = AlertKey::from(&candidate);
            if self.ledger.is_cooling_down(&key, now, self.cooldown) {
                tracing::debug!(
                    symbol = %candidate.symbol,
                    window_secs = candidate.window_secs,
                    direction = %candidate.direction,
                    "Alert suppressed by cooldown"
                );
                telemetry::increment(CounterMetric::AlertsSuppressed);
                continue;
            }
            self.ledger.mark_fired(key, now);
            surviving.push(candidate);
        }

        surviving
    }

    /// Read-only view of the ledger
    pub fn ledger(&self) -> &CooldownLedger {
        &self.ledger
    }

    /// Cooldown in seconds
    pub fn cooldown_secs(&self) -> u64 {
        self.cooldown.num_seconds() as u64
    }
}

impl Default for AlertThrottle {
    fn default() -> Self {
        Self::with_defaults()
    }
}
