//! Structured logging setup

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl LogFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Initialize logging with the given level
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_logging(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    Ok(())
}
