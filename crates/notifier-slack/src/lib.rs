//! Slack status-panel publishing for CI workflows.
//!
//! Keeps one evolving Slack message per workflow run: job outcomes are
//! merged into a status panel, rendered into a Block Kit message, and
//! either posted or written over the message referenced by a handle.

mod job_model;
mod message_render;
mod notification_sync;
mod slack_api_client;
mod slack_transport;
mod slack_wire;
mod status_panel;

pub use job_model::{JobOutcome, JobStage, UnknownJobStage};
pub use message_render::{
    build_title, humanize_repository_name, render_status_message, MessageBranding,
};
pub use notification_sync::{NotificationSyncClient, PublishError};
pub use slack_api_client::{SlackApiClient, SlackApiConfig, DEFAULT_SLACK_API_BASE};
pub use slack_transport::{SlackPostedMessage, SlackTransport, SlackTransportError};
pub use slack_wire::{
    AttachmentField, MessageHandle, SlackAttachment, SlackBlock, SlackHistoryMessage,
    SlackMessage, SlackText,
};
pub use status_panel::{
    decorate_label_with_timestamp, sync_status_panel, sync_status_panel_at, MergePolicy,
    StatusEntry, StatusPanel,
};
