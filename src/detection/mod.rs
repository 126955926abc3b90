//! Change detection module
//!
//! Compares the latest price of every symbol against a reference price at
//! the start of each configured window and emits pump/dump candidates when
//! the move crosses that window's thresholds.

mod detector;
mod types;
mod window;

pub use detector::{pct_change, ChangeDetector};
pub use types::{CandidateEvent, Direction};
pub use window::{window_label, WindowRule};
