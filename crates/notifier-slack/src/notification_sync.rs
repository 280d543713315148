//! Create-or-update orchestration for the single CI status message.
//!
//! Without a prior handle a fresh message is posted. With one, the stored
//! message is read back first so its status panel can be merged with the new
//! outcome, then the same message is updated in place. A failed read never
//! blocks the update; the panel is rebuilt from scratch instead.

use std::sync::Arc;

use notifier_events::CanonicalEvent;
use thiserror::Error;

use crate::job_model::{JobOutcome, JobStage};
use crate::message_render::{render_status_message, MessageBranding};
use crate::slack_transport::{SlackPostedMessage, SlackTransport, SlackTransportError};
use crate::slack_wire::{MessageHandle, SlackMessage};
use crate::status_panel::{sync_status_panel, MergePolicy, StatusPanel};

const HISTORY_LOOKUP_LIMIT: usize = 1;

#[derive(Debug, Error)]
/// Enumerates supported `PublishError` values.
pub enum PublishError {
    #[error("failed to create slack status message: {0}")]
    Create(#[source] SlackTransportError),
    #[error("failed to update slack status message {handle}: {source}")]
    Update {
        handle: MessageHandle,
        #[source]
        source: SlackTransportError,
    },
    #[error("slack {method} response did not include a message ts")]
    MissingHandle { method: &'static str },
}

#[derive(Clone)]
/// Publishes job outcomes to one channel through an injected transport.
pub struct NotificationSyncClient {
    transport: Arc<dyn SlackTransport>,
    channel_id: String,
    branding: MessageBranding,
    policy: MergePolicy,
}

impl NotificationSyncClient {
    pub fn new(
        transport: Arc<dyn SlackTransport>,
        channel_id: impl Into<String>,
        branding: MessageBranding,
        policy: MergePolicy,
    ) -> Self {
        Self {
            transport,
            channel_id: channel_id.into(),
            branding,
            policy,
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Posts or updates the status message and returns the handle to carry
    /// into the next invocation.
    pub async fn publish(
        &self,
        event: &CanonicalEvent,
        stage: JobStage,
        outcome: JobOutcome,
        prior_handle: Option<&MessageHandle>,
    ) -> Result<MessageHandle, PublishError> {
        match prior_handle {
            None => self.create(event, stage, outcome).await,
            Some(handle) => self.update(event, stage, outcome, handle).await,
        }
    }

    async fn create(
        &self,
        event: &CanonicalEvent,
        stage: JobStage,
        outcome: JobOutcome,
    ) -> Result<MessageHandle, PublishError> {
        let panel = sync_status_panel(None, stage, outcome, self.policy);
        let message = self.render(event, &panel, None);
        let posted = self
            .transport
            .post_message(&message)
            .await
            .map_err(PublishError::Create)?;
        let handle = posted_handle("chat.postMessage", posted)?;
        tracing::info!(
            channel = %self.channel_id,
            ts = %handle,
            job_type = %stage,
            job_status = %outcome,
            entries = panel.len(),
            "created slack status message"
        );
        Ok(handle)
    }

    async fn update(
        &self,
        event: &CanonicalEvent,
        stage: JobStage,
        outcome: JobOutcome,
        handle: &MessageHandle,
    ) -> Result<MessageHandle, PublishError> {
        let previous = self.load_previous_panel(handle).await;
        let panel = sync_status_panel(Some(&previous), stage, outcome, self.policy);
        let message = self.render(event, &panel, Some(handle));
        let updated = self
            .transport
            .update_message(&message)
            .await
            .map_err(|source| PublishError::Update {
                handle: handle.clone(),
                source,
            })?;
        let updated_handle = posted_handle("chat.update", updated)?;
        tracing::info!(
            channel = %self.channel_id,
            ts = %updated_handle,
            job_type = %stage,
            job_status = %outcome,
            previous_entries = previous.len(),
            entries = panel.len(),
            policy = self.policy.as_str(),
            "updated slack status message"
        );
        Ok(updated_handle)
    }

    /// Reads the stored message back. Any failure yields an empty panel.
    async fn load_previous_panel(&self, handle: &MessageHandle) -> StatusPanel {
        match self
            .transport
            .fetch_history(&self.channel_id, handle.as_str(), HISTORY_LOOKUP_LIMIT)
            .await
        {
            Ok(messages) => match messages.first() {
                Some(stored) => StatusPanel::from_attachments(&stored.attachments),
                None => {
                    tracing::warn!(
                        channel = %self.channel_id,
                        ts = %handle,
                        "no stored slack message found, rebuilding status panel"
                    );
                    StatusPanel::new()
                }
            },
            Err(error) => {
                tracing::warn!(
                    channel = %self.channel_id,
                    ts = %handle,
                    error = %error,
                    "failed to fetch slack message history, rebuilding status panel"
                );
                StatusPanel::new()
            }
        }
    }

    fn render(
        &self,
        event: &CanonicalEvent,
        panel: &StatusPanel,
        handle: Option<&MessageHandle>,
    ) -> SlackMessage {
        render_status_message(event, panel, &self.channel_id, handle, &self.branding)
    }
}

fn posted_handle(
    method: &'static str,
    posted: SlackPostedMessage,
) -> Result<MessageHandle, PublishError> {
    MessageHandle::from_optional(posted.ts.as_deref())
        .ok_or(PublishError::MissingHandle { method })
}
