//! Rolling price history
//!
//! Keeps a trailing window of (timestamp, price) samples per symbol. The
//! change detector reads reference prices from here.

mod store;
mod types;

pub use store::{HistoryStore, DEFAULT_RETENTION_SECS};
pub use types::{bounded_seconds, Sample, Snapshot, MAX_DURATION_SECS};
