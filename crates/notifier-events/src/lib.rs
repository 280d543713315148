//! GitHub Actions event normalization for the Slack CI notifier.
//!
//! Raw event documents arrive in several loosely related shapes (push,
//! pull request opened, issue comment created, trunk-based merges). This
//! crate matches a document against those shapes in priority order and
//! folds the result into one [`CanonicalEvent`] consumed by rendering.

pub mod canonical_event;
pub mod event_schema;

pub use canonical_event::{
    pull_request_identifier, sanitize_change_message, CanonicalEvent, EventContext,
    CHANGE_MESSAGE_MAX_CHARS, DEFAULT_GITHUB_SERVER_URL,
};
pub use event_schema::{match_event_document, CanonicalFields, EventShape, SchemaMatch};
