//! Inbound command handling
//!
//! Polls the command channel once per cycle and answers status queries.
//! Nothing here can fail the scan cycle: every outcome, good or bad, is
//! reported back as a [`PollOutcome`].

use crate::notify::{NotificationSink, NotifyError};
use crate::telemetry::{self, CounterMetric};
use async_trait::async_trait;

/// A message received from the command channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCommand {
    /// Free-text content
    pub text: String,
    /// Where a reply should go
    pub reply_to: String,
}

/// Result of one poll of the command channel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBatch {
    /// Cursor past every update seen, `None` when nothing new arrived
    pub next_cursor: Option<i64>,
    pub commands: Vec<IncomingCommand>,
}

/// Trait for inbound command channel implementations
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Fetch commands after `cursor`
    async fn poll(&self, cursor: Option<i64>) -> Result<CommandBatch, NotifyError>;
}

/// Recognized commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// "status" or "/status", any case
    Status,
}

impl Command {
    /// Parse free text; anything unrecognized is `None`
    pub fn parse(text: &str) -> Option<Command> {
        match text.trim().to_lowercase().as_str() {
            "/status" | "status" => Some(Command::Status),
            _ => None,
        }
    }
}

/// What happened during one drain of the command channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Poll succeeded
    Handled {
        /// Commands received
        seen: usize,
        /// Status replies delivered
        replied: usize,
    },
    /// Poll failed; the cursor was left unchanged
    Failed(String),
}

/// Owns the command cursor and the canned status reply
#[derive(Debug, Clone)]
pub struct CommandResponder {
    cursor: Option<i64>,
    status_text: String,
}

impl CommandResponder {
    pub fn new(status_text: impl Into<String>) -> Self {
        Self {
            cursor: None,
            status_text: status_text.into(),
        }
    }

    /// Current cursor
    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Poll once and reply to every status command
    ///
    /// The cursor moves past every command in the batch, recognized or not.
    /// Reply delivery failures are logged and skipped.
    pub async fn drain<C, S>(&mut self, channel: &C, sink: &S) -> PollOutcome
    where
        C: CommandChannel + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let batch = match channel.poll(self.cursor).await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::debug!(error = %e, "Command poll failed");
                return PollOutcome::Failed(e.to_string());
            }
        };

        if let Some(next) = batch.next_cursor {
            self.cursor = Some(next);
        }

        let mut replied = 0;
        for command in &batch.commands {
            match Command::parse(&command.text) {
                Some(Command::Status) => {
                    match sink.deliver(&self.status_text, &command.reply_to).await {
                        Ok(()) => {
                            replied += 1;
                            telemetry::increment(CounterMetric::StatusReplies);
                        }
                        Err(e) => {
                            tracing::warn!(
                                error = %e,
                                reply_to = %command.reply_to,
                                "Status reply failed"
                            );
                        }
                    }
                }
                None => {
                    tracing::trace!(text = %command.text, "Ignoring unrecognized command");
                }
            }
        }

        PollOutcome::Handled {
            seen: batch.commands.len(),
            replied,
        }
    }
}
