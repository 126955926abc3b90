//! Window rule table

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Human label for a window duration: whole minutes as "5m", otherwise "90s"
pub fn window_label(seconds: u64) -> String {
    if seconds > 0 && seconds % 60 == 0 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Thresholds for one trailing window
///
/// Each direction is enabled independently. A rule with neither threshold
/// set is inert and never yields an event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowRule {
    /// Window duration in seconds
    pub seconds: u64,
    /// Pump threshold in percent (positive), `None` disables the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub up_pct: Option<Decimal>,
    /// Dump threshold in percent (negative), `None` disables the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_pct: Option<Decimal>,
}

impl WindowRule {
    pub fn new(seconds: u64, up_pct: Option<Decimal>, down_pct: Option<Decimal>) -> Self {
        Self {
            seconds,
            up_pct,
            down_pct,
        }
    }

    /// Upward-only rule
    pub fn pump(seconds: u64, up_pct: Decimal) -> Self {
        Self::new(seconds, Some(up_pct), None)
    }

    /// Downward-only rule
    pub fn dump(seconds: u64, down_pct: Decimal) -> Self {
        Self::new(seconds, None, Some(down_pct))
    }

    /// Rule with both directions off
    pub fn disabled(seconds: u64) -> Self {
        Self::new(seconds, None, None)
    }

    /// Whether any direction is checked
    pub fn is_enabled(&self) -> bool {
        self.up_pct.is_some() || self.down_pct.is_some()
    }

    /// +4% over 1m, -5% over 5m, and a disabled 15m slot
    pub fn default_table() -> Vec<WindowRule> {
        vec![
            WindowRule::pump(60, dec!(4.0)),
            WindowRule::dump(300, dec!(-5.0)),
            WindowRule::disabled(900),
        ]
    }
}
