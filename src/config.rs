//! Configuration types for pumpwatch
//!
//! Tunables come from a TOML file where every field has a default.
//! Credentials never live in the file: they are read from the environment.

use crate::detection::WindowRule;
use crate::history::MAX_DURATION_SECS;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the CoinMarketCap API key
pub const ENV_CMC_API_KEY: &str = "CMC_API_KEY";
/// Environment variable holding the Telegram bot token
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
/// Environment variable holding the default alert destination
pub const ENV_CHAT_ID: &str = "CHAT_ID";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required secrets are absent from the environment
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),
    /// A window rule is malformed
    #[error("Invalid window rule for {seconds}s: {reason}")]
    InvalidWindow { seconds: u64, reason: String },
    /// A scalar setting is out of range
    #[error("Invalid setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
    /// Config file could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// Config file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Whether the config file simply does not exist
    pub fn is_missing_file(&self) -> bool {
        matches!(self, ConfigError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Snapshot source (listings API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_url")]
    pub base_url: String,
    /// Number of top-ranked assets to track
    #[serde(default = "default_universe_size")]
    pub universe_size: u32,
    /// Quote currency for all prices
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    /// Ranking criterion
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_source_url() -> String {
    crate::source::CMC_API_URL.to_string()
}
fn default_universe_size() -> u32 {
    200
}
fn default_quote_currency() -> String {
    "USD".to_string()
}
fn default_sort() -> String {
    "market_cap".to_string()
}
fn default_source_timeout() -> u64 {
    20
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_url(),
            universe_size: default_universe_size(),
            quote_currency: default_quote_currency(),
            sort: default_sort(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Telegram Bot API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    #[serde(default = "default_notify_url")]
    pub base_url: String,
    /// Timeout for sendMessage
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
    /// Timeout for getUpdates
    #[serde(default = "default_notify_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_notify_url() -> String {
    crate::notify::TELEGRAM_API_URL.to_string()
}
fn default_notify_timeout() -> u64 {
    10
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_notify_url(),
            timeout_secs: default_notify_timeout(),
            poll_timeout_secs: default_notify_timeout(),
        }
    }
}

/// Scan loop timing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Sleep between cycles
    #[serde(default = "default_period")]
    pub period_secs: u64,
    /// Maximum sample age kept in history
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    /// Minimum spacing between alerts sharing a key
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
    /// Delay after a snapshot fetch answered with an error status
    #[serde(default = "default_http_error_delay")]
    pub http_error_delay_secs: u64,
    /// Delay after any other cycle failure
    #[serde(default = "default_error_delay")]
    pub error_delay_secs: u64,
}

fn default_period() -> u64 {
    10
}
fn default_retention() -> u64 {
    20 * 60
}
fn default_cooldown() -> u64 {
    10 * 60
}
fn default_http_error_delay() -> u64 {
    5
}
fn default_error_delay() -> u64 {
    3
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period(),
            retention_secs: default_retention(),
            cooldown_secs: default_cooldown(),
            http_error_delay_secs: default_http_error_delay(),
            error_delay_secs: default_error_delay(),
        }
    }
}

/// Change detector window table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DetectorConfig {
    #[serde(default = "default_windows")]
    pub windows: Vec<WindowRule>,
}

fn default_windows() -> Vec<WindowRule> {
    WindowRule::default_table()
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
    /// Prometheus exporter port; no exporter when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.universe_size == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "source.universe_size",
                reason: "must be positive".to_string(),
            });
        }

        let durations = [
            ("scan.period_secs", self.scan.period_secs),
            ("scan.retention_secs", self.scan.retention_secs),
            ("scan.cooldown_secs", self.scan.cooldown_secs),
            ("scan.http_error_delay_secs", self.scan.http_error_delay_secs),
            ("scan.error_delay_secs", self.scan.error_delay_secs),
        ];
        for (field, secs) in durations {
            check_duration(field, secs)?;
        }
        for (field, secs) in [
            ("scan.period_secs", self.scan.period_secs),
            ("scan.retention_secs", self.scan.retention_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::InvalidSetting {
                    field,
                    reason: "must be positive".to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.detector.windows {
            if rule.seconds == 0 {
                return Err(ConfigError::InvalidWindow {
                    seconds: rule.seconds,
                    reason: "duration must be positive".to_string(),
                });
            }
            if rule.seconds > MAX_DURATION_SECS {
                return Err(ConfigError::InvalidWindow {
                    seconds: rule.seconds,
                    reason: format!("duration exceeds {}s", MAX_DURATION_SECS),
                });
            }
            if !seen.insert(rule.seconds) {
                return Err(ConfigError::InvalidWindow {
                    seconds: rule.seconds,
                    reason: "duplicate duration".to_string(),
                });
            }
            if let Some(up) = rule.up_pct {
                if up <= Decimal::ZERO {
                    return Err(ConfigError::InvalidWindow {
                        seconds: rule.seconds,
                        reason: format!("up_pct must be positive, got {}", up),
                    });
                }
            }
            if let Some(down) = rule.down_pct {
                if down >= Decimal::ZERO {
                    return Err(ConfigError::InvalidWindow {
                        seconds: rule.seconds,
                        reason: format!("down_pct must be negative, got {}", down),
                    });
                }
            }
            // A window longer than retention never finds a reference
            if rule.is_enabled() && rule.seconds > self.scan.retention_secs {
                return Err(ConfigError::InvalidWindow {
                    seconds: rule.seconds,
                    reason: format!(
                        "longer than scan.retention_secs ({}s)",
                        self.scan.retention_secs
                    ),
                });
            }
        }
        Ok(())
    }
}

fn check_duration(field: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs > MAX_DURATION_SECS {
        return Err(ConfigError::InvalidSetting {
            field,
            reason: format!("must be at most {}s, got {}", MAX_DURATION_SECS, secs),
        });
    }
    Ok(())
}

/// Credentials for the external collaborators
#[derive(Clone)]
pub struct Secrets {
    pub cmc_api_key: String,
    pub bot_token: String,
    /// Default destination for alerts and the startup announcement
    pub chat_id: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("cmc_api_key", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Secrets {
    /// Read secrets from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read secrets through an arbitrary lookup; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let cmc_api_key = get(ENV_CMC_API_KEY);
        let bot_token = get(ENV_BOT_TOKEN);
        let chat_id = get(ENV_CHAT_ID);

        match (cmc_api_key, bot_token, chat_id) {
            (Some(cmc_api_key), Some(bot_token), Some(chat_id)) => Ok(Self {
                cmc_api_key,
                bot_token,
                chat_id,
            }),
            (k, t, c) => {
                let mut missing = Vec::new();
                if k.is_none() {
                    missing.push(ENV_CMC_API_KEY);
                }
                if t.is_none() {
                    missing.push(ENV_BOT_TOKEN);
                }
                if c.is_none() {
                    missing.push(ENV_CHAT_ID);
                }
                Err(ConfigError::MissingSecrets(missing))
            }
        }
    }
}
