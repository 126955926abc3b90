//! pumpwatch: pump/dump surveillance for top-ranked crypto assets
//!
//! This library provides the core components for:
//! - Periodic price snapshots from the CoinMarketCap listings API
//! - A rolling per-symbol price history with bounded retention
//! - Percent change detection over independent time windows
//! - Per-(symbol, window, direction) alert cooldowns
//! - Telegram alert delivery and `/status` command replies
//! - A fixed-period scan loop tying it all together

pub mod cli;
pub mod command;
pub mod config;
pub mod detection;
pub mod history;
pub mod notify;
pub mod scanner;
pub mod source;
pub mod telemetry;
pub mod throttle;
