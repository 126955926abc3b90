//! Multi-window percent change detector

use super::types::{CandidateEvent, Direction};
use super::window::WindowRule;
use crate::history::HistoryStore;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Percent change from `p_ref` to `p_now`: `(p_now / p_ref - 1) * 100`
///
/// Undefined (`None`) when the reference is not positive or the arithmetic
/// overflows.
pub fn pct_change(p_now: Decimal, p_ref: Decimal) -> Option<Decimal> {
    if p_ref <= Decimal::ZERO {
        return None;
    }
    p_now
        .checked_div(p_ref)?
        .checked_sub(Decimal::ONE)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// Evaluates every symbol in a [`HistoryStore`] against a window table
///
/// Each window is independent. Within a window the up and down checks are
/// also independent, so a rule with both thresholds set can yield a pump
/// and a dump for the same symbol in one scan.
#[derive(Debug, Clone)]
pub struct ChangeDetector {
    rules: Vec<WindowRule>,
}

impl ChangeDetector {
    /// Create a detector over the given window table
    pub fn new(rules: Vec<WindowRule>) -> Self {
        Self { rules }
    }

    /// Detector with the default +4%/1m pump and -5%/5m dump rules
    pub fn with_defaults() -> Self {
        Self::new(WindowRule::default_table())
    }

    /// Configured rules
    pub fn rules(&self) -> &[WindowRule] {
        &self.rules
    }

    /// Produce candidate events for every symbol with at least two samples
    pub fn scan(&self, history: &HistoryStore, now: DateTime<Utc>) -> Vec<CandidateEvent> {
        let mut events = Vec::new();

        for (symbol, samples) in history.iter() {
            if samples.len() < 2 {
                continue;
            }
            let Some(latest) = samples.back() else {
                continue;
            };

            for rule in self.rules.iter().filter(|r| r.is_enabled()) {
                self.evaluate(history, symbol, latest.price, now, rule, &mut events);
            }
        }

        tracing::trace!(candidates = events.len(), "Detector scan complete");
        events
    }

    fn evaluate(
        &self,
        history: &HistoryStore,
        symbol: &str,
        p_now: Decimal,
        now: DateTime<Utc>,
        rule: &WindowRule,
        out: &mut Vec<CandidateEvent>,
    ) {
        let Some(p_ref) = history.query_reference(symbol, now, rule.seconds) else {
            return;
        };
        let Some(pct) = pct_change(p_now, p_ref) else {
            return;
        };

        let event = |direction| CandidateEvent {
            symbol: symbol.to_string(),
            window_secs: rule.seconds,
            pct_change: pct,
            price: p_now,
            reference_price: p_ref,
            direction,
        };

        if let Some(up) = rule.up_pct {
            if pct >= up {
                out.push(event(Direction::Pump));
            }
        }
        if let Some(down) = rule.down_pct {
            if pct <= down {
                out.push(event(Direction::Dump));
            }
        }
    }
}

impl Default for ChangeDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}
