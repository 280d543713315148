//! Transport seam between the sync client and the Slack Web API.

use async_trait::async_trait;
use thiserror::Error;

use crate::slack_wire::{SlackHistoryMessage, SlackMessage};

#[derive(Debug, Error)]
/// Enumerates supported `SlackTransportError` values.
pub enum SlackTransportError {
    #[error("invalid slack client configuration: {0}")]
    InvalidConfig(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("slack api {method} returned non-success status {status}: {body}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        body: String,
    },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("slack api {method} failed: {error}")]
    Api { method: &'static str, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Result of `chat.postMessage` / `chat.update`. The handle may be missing;
/// callers decide whether that is fatal.
pub struct SlackPostedMessage {
    pub channel: Option<String>,
    pub ts: Option<String>,
}

#[async_trait]
/// Trait contract for `SlackTransport` behavior. Each call is a single
/// attempt; a non-2xx status or `ok:false` is an error.
pub trait SlackTransport: Send + Sync {
    async fn post_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError>;

    async fn update_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError>;

    /// Reads up to `limit` messages starting at `oldest` (inclusive).
    async fn fetch_history(
        &self,
        channel: &str,
        oldest: &str,
        limit: usize,
    ) -> Result<Vec<SlackHistoryMessage>, SlackTransportError>;
}
