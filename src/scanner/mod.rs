//! Scan loop module
//!
//! Ties the snapshot source, history store, detector, throttle and
//! notification sink into one fixed-period cycle.

mod orchestrator;
mod types;

pub use orchestrator::ScanLoop;
pub use types::{CycleOutcome, CycleSummary, ScanSettings};
