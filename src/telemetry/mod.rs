//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{increment, init_metrics, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Guard that keeps telemetry alive for the process lifetime
pub struct TelemetryGuard {
    _priv: (),
}

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<TelemetryGuard> {
    init_logging(&config.log_level, LogFormat::from_json_flag(config.json))?;

    if let Some(port) = config.metrics_port {
        init_metrics(port)?;
    }

    Ok(TelemetryGuard { _priv: () })
}
