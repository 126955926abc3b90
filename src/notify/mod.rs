//! Notification module
//!
//! Alert text formatting and delivery through the Telegram Bot API.

mod format;
mod telegram;

pub use format::{announcement_text, format_alert, format_price, rules_summary, status_text};
pub use telegram::{TelegramClient, TelegramConfig, TELEGRAM_API_URL};

use async_trait::async_trait;
use thiserror::Error;

/// Notification transport errors
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The Bot API answered with a non-success status
    #[error("Bot API error: {status} - {body}")]
    Http { status: u16, body: String },
    /// Network failure or timeout (URL stripped, it embeds the token)
    #[error("Bot API request failed: {0}")]
    Request(String),
    /// The payload did not have the expected shape
    #[error("Malformed Bot API payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        NotifyError::Request(err.without_url().to_string())
    }
}

/// Trait for notification sink implementations
///
/// Failures are returned, never raised past the call site: callers log
/// them and carry on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `text` to `destination`
    async fn deliver(&self, text: &str, destination: &str) -> Result<(), NotifyError>;
}
