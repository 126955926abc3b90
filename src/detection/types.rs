//! Change detection types

use super::window::window_label;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a qualifying move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Upward move at or above the window's up threshold
    Pump,
    /// Downward move at or below the window's down threshold
    Dump,
}

impl Direction {
    /// Label used in alert text
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Pump => "PUMP",
            Direction::Dump => "DUMP",
        }
    }

    /// Chart emoji prefix used in alert text
    pub fn emoji(&self) -> &'static str {
        match self {
            Direction::Pump => "📈",
            Direction::Dump => "📉",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A move that crossed a threshold in the current cycle
///
/// Candidates are rebuilt from scratch every cycle; the throttle decides
/// which of them are actually delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvent {
    /// Upper-case asset symbol
    pub symbol: String,
    /// Window duration that produced the event
    pub window_secs: u64,
    /// Signed percent change, e.g. 4.0 for +4%
    pub pct_change: Decimal,
    /// Latest price
    pub price: Decimal,
    /// Reference price at the start of the window
    pub reference_price: Decimal,
    pub direction: Direction,
}

impl CandidateEvent {
    /// Magnitude used for ranking
    pub fn magnitude(&self) -> Decimal {
        self.pct_change.abs()
    }

    /// Window as a human label, e.g. "5m" for 300s
    pub fn window_label(&self) -> String {
        window_label(self.window_secs)
    }
}
