//! Telegram Bot API client
//!
//! Sends alerts with `sendMessage` and reads inbound commands with
//! `getUpdates`. Both calls carry their own timeout.

use super::{NotificationSink, NotifyError};
use crate::command::{CommandBatch, CommandChannel, IncomingCommand};
use crate::config::NotifyConfig;
use crate::source::excerpt;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram client
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Base URL for the Bot API
    pub base_url: String,
    /// Timeout for sendMessage
    pub send_timeout: Duration,
    /// Timeout for getUpdates
    pub poll_timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: TELEGRAM_API_URL.to_string(),
            send_timeout: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&NotifyConfig> for TelegramConfig {
    fn from(config: &NotifyConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            send_timeout: Duration::from_secs(config.timeout_secs),
            poll_timeout: Duration::from_secs(config.poll_timeout_secs),
        }
    }
}

/// Client for the Telegram Bot API
pub struct TelegramClient {
    config: TelegramConfig,
    token: String,
    client: Client,
}

impl TelegramClient {
    /// Create a client for the bot identified by `token`
    pub fn new(config: TelegramConfig, token: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder().build()?;

        Ok(Self {
            config,
            token: token.into(),
            client,
        })
    }

    /// URL for a Bot API method
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.token,
            method
        )
    }

    /// Turn a getUpdates body into a command batch
    ///
    /// Every update advances the cursor, including ones that carry no
    /// message or no text.
    fn parse_updates(body: &str) -> Result<CommandBatch, NotifyError> {
        let response: UpdatesResponse =
            serde_json::from_str(body).map_err(|e| NotifyError::Decode(e.to_string()))?;

        if !response.ok {
            return Err(NotifyError::Decode(
                response
                    .description
                    .unwrap_or_else(|| "getUpdates returned ok=false".to_string()),
            ));
        }

        let mut batch = CommandBatch::default();
        for update in response.result {
            batch.next_cursor = Some(update.update_id + 1);

            let Some(message) = update.message else {
                continue;
            };
            batch.commands.push(IncomingCommand {
                text: message.text.unwrap_or_default(),
                reply_to: message.chat.id.to_string(),
            });
        }

        Ok(batch)
    }
}

#[async_trait]
impl NotificationSink for TelegramClient {
    async fn deliver(&self, text: &str, destination: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .timeout(self.config.send_timeout)
            .json(&SendMessage {
                chat_id: destination,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl CommandChannel for TelegramClient {
    async fn poll(&self, cursor: Option<i64>) -> Result<CommandBatch, NotifyError> {
        let mut query = vec![("timeout", "0".to_string())];
        if let Some(offset) = cursor {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .timeout(self.config.poll_timeout)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        Self::parse_updates(&body)
    }
}

/// sendMessage request body
#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// getUpdates response envelope
#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}
