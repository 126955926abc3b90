//! History types

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Longest duration accepted for windows, retention and cooldowns: 7 days
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Seconds as a signed delta, saturating at [`MAX_DURATION_SECS`]
pub fn bounded_seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_DURATION_SECS) as i64)
}

/// One price reading per tracked symbol, keyed by upper-case symbol
pub type Snapshot = HashMap<String, Decimal>;

/// A single price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// When the snapshot containing this price was taken
    pub timestamp: DateTime<Utc>,
    /// Price in the quote currency
    pub price: Decimal,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}
