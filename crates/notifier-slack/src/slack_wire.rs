//! Slack Web API message shapes produced by the renderer and read back
//! from `conversations.history`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Opaque Slack message timestamp identifying the status message across runs.
pub struct MessageHandle(String);

impl MessageHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns `None` for absent or blank values, which mean "create".
    pub fn from_optional(value: Option<&str>) -> Option<Self> {
        value
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Body sent to `chat.postMessage` / `chat.update`.
pub struct SlackMessage {
    pub channel: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
    pub text: String,
    #[serde(default)]
    pub blocks: Vec<SlackBlock>,
    #[serde(default)]
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<SlackText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<SlackText>>,
}

impl SlackBlock {
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            kind: "header".to_string(),
            text: Some(SlackText::plain(text)),
            fields: None,
        }
    }

    pub fn divider() -> Self {
        Self {
            kind: "divider".to_string(),
            text: None,
            fields: None,
        }
    }

    pub fn section_fields(fields: Vec<SlackText>) -> Self {
        Self {
            kind: "section".to_string(),
            text: None,
            fields: Some(fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackText {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl SlackText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: "plain_text".to_string(),
            text: text.into(),
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Legacy coloured attachment carrying one status entry.
pub struct SlackAttachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub fields: Vec<AttachmentField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub short: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// The part of a stored message needed to recover its status panel.
pub struct SlackHistoryMessage {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub attachments: Vec<SlackAttachment>,
}
