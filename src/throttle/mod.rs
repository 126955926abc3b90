//! Alert throttling module
//!
//! Ranks candidate events by magnitude and suppresses repeats of the same
//! (symbol, window, direction) key inside a cooldown period.

mod cooldown;

pub use cooldown::{
    rank_by_magnitude, AlertKey, AlertThrottle, CooldownLedger, DEFAULT_COOLDOWN_SECS,
};
