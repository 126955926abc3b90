//! Prometheus metrics

use std::net::{Ipv4Addr, SocketAddr};

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed scan cycles
    Cycles,
    /// Snapshot fetches that failed
    FetchFailures,
    /// Alerts handed to the notification sink successfully
    AlertsDelivered,
    /// Candidates dropped by the cooldown
    AlertsSuppressed,
    /// Alerts whose delivery failed
    DeliveryFailures,
    /// Status commands answered
    StatusReplies,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols with retained history
    TrackedSymbols,
    /// Candidates produced by the last scan
    LastCandidates,
}

impl CounterMetric {
    pub fn name(&self) -> &'static str {
        match self {
            CounterMetric::Cycles => "pumpwatch_cycles_total",
            CounterMetric::FetchFailures => "pumpwatch_fetch_failures_total",
            CounterMetric::AlertsDelivered => "pumpwatch_alerts_delivered_total",
            CounterMetric::AlertsSuppressed => "pumpwatch_alerts_suppressed_total",
            CounterMetric::DeliveryFailures => "pumpwatch_delivery_failures_total",
            CounterMetric::StatusReplies => "pumpwatch_status_replies_total",
        }
    }
}

impl GaugeMetric {
    pub fn name(&self) -> &'static str {
        match self {
            GaugeMetric::TrackedSymbols => "pumpwatch_tracked_symbols",
            GaugeMetric::LastCandidates => "pumpwatch_last_candidates",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Install the Prometheus exporter on `0.0.0.0:port`
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
