//! Snapshot source module
//!
//! Fetches one price per tracked asset from the listings API.

mod coinmarketcap;

pub use coinmarketcap::{CmcClient, CmcConfig, CMC_API_URL};

use crate::history::Snapshot;
use async_trait::async_trait;
use thiserror::Error;

/// Maximum characters of a response body kept for diagnostics
pub const BODY_EXCERPT_CHARS: usize = 200;

/// Snapshot source errors
#[derive(Debug, Error)]
pub enum SourceError {
    /// The API answered with a non-success status
    #[error("Listings API error: {status} - {body}")]
    Http { status: u16, body: String },
    /// Network failure or timeout
    #[error("Listings request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The payload did not have the expected shape
    #[error("Malformed listings payload: {0}")]
    Decode(String),
}

impl SourceError {
    /// Whether the API itself rejected the request
    pub fn is_http_status(&self) -> bool {
        matches!(self, SourceError::Http { .. })
    }
}

/// Trait for snapshot source implementations
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch current prices for the tracked universe, keyed by upper-case symbol
    async fn fetch(&self) -> Result<Snapshot, SourceError>;
}

/// Truncate a response body to at most [`BODY_EXCERPT_CHARS`] characters
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}
