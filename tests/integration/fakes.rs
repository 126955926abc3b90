//! In-memory stand-ins for the external collaborators

use async_trait::async_trait;
use pumpwatch::command::{CommandBatch, CommandChannel, IncomingCommand};
use pumpwatch::history::Snapshot;
use pumpwatch::notify::{NotificationSink, NotifyError};
use pumpwatch::source::{SnapshotSource, SourceError};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Replays scripted snapshots, one per fetch
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Snapshot, SourceError>>>,
}

impl ScriptedSource {
    pub fn push(&self, entries: &[(&str, Decimal)]) {
        let snapshot = entries.iter().map(|(s, p)| (s.to_string(), *p)).collect();
        self.responses.lock().unwrap().push_back(Ok(snapshot));
    }

    pub fn push_err(&self, err: SourceError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch(&self) -> Result<Snapshot, SourceError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::Decode("script exhausted".to_string())))
    }
}

/// Records every delivery; can be switched to fail
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|(text, _)| text).collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, text: &str, destination: &str) -> Result<(), NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Http {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((text.to_string(), destination.to_string()));
        Ok(())
    }
}

/// Hands out queued commands once, tracking the cursors it was asked for
#[derive(Default)]
pub struct QueuedCommands {
    pending: Mutex<Vec<IncomingCommand>>,
    next_id: Mutex<i64>,
    cursors: Mutex<Vec<Option<i64>>>,
    failing: AtomicBool,
}

impl QueuedCommands {
    pub fn push(&self, text: &str, reply_to: &str) {
        self.pending.lock().unwrap().push(IncomingCommand {
            text: text.to_string(),
            reply_to: reply_to.to_string(),
        });
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn cursors(&self) -> Vec<Option<i64>> {
        self.cursors.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandChannel for QueuedCommands {
    async fn poll(&self, cursor: Option<i64>) -> Result<CommandBatch, NotifyError> {
        self.cursors.lock().unwrap().push(cursor);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Request("timed out".to_string()));
        }

        let commands: Vec<IncomingCommand> = self.pending.lock().unwrap().drain(..).collect();
        if commands.is_empty() {
            return Ok(CommandBatch::default());
        }

        let mut next_id = self.next_id.lock().unwrap();
        *next_id += commands.len() as i64;
        Ok(CommandBatch {
            next_cursor: Some(*next_id),
            commands,
        })
    }
}
