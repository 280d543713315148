//! Block Kit rendering of the CI status message.

use notifier_events::CanonicalEvent;

use crate::slack_wire::{MessageHandle, SlackBlock, SlackMessage, SlackText};
use crate::status_panel::StatusPanel;

const TITLE_FALLBACK: &str = "Something went wrong";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Optional service name and emoji shown in the message header.
pub struct MessageBranding {
    pub service_name: Option<String>,
    pub service_emoji: Option<String>,
}

impl MessageBranding {
    pub fn new(service_name: Option<String>, service_emoji: Option<String>) -> Self {
        Self {
            service_name: non_blank(service_name),
            service_emoji: non_blank(service_emoji),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `owner/my-service-api` becomes `My Service Api`.
pub fn humanize_repository_name(repository: &str) -> Option<String> {
    let name = repository.rsplit('/').next().unwrap_or_default().trim();
    if name.is_empty() {
        return None;
    }
    let words = name
        .split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn build_title(repository: &str, workflow: Option<&str>, branding: &MessageBranding) -> String {
    let name = branding
        .service_name
        .clone()
        .or_else(|| humanize_repository_name(repository));
    let workflow = workflow.map(str::trim).filter(|value| !value.is_empty());

    let Some(name) = name else {
        return workflow.unwrap_or(TITLE_FALLBACK).to_string();
    };
    let headline = match &branding.service_emoji {
        Some(emoji) => format!("{emoji} {name}"),
        None => name,
    };
    match workflow {
        Some(workflow) => format!("{headline} - {workflow}"),
        None => headline,
    }
}

fn field(label: &str, value: &str) -> SlackText {
    SlackText::markdown(format!(" \n*{label}:*\n{value}"))
}

fn linked(url: &str, text: &str) -> String {
    format!("<{url}|{text}>")
}

/// Renders the full message body. A `prior_handle` targets an update of that
/// message; without one the body is for a fresh post.
pub fn render_status_message(
    event: &CanonicalEvent,
    panel: &StatusPanel,
    channel_id: &str,
    prior_handle: Option<&MessageHandle>,
    branding: &MessageBranding,
) -> SlackMessage {
    let title = build_title(&event.repository, event.workflow.as_deref(), branding);
    let message = event.change_message.as_deref().unwrap_or("No message");
    let identifier = event.change_identifier.as_deref().unwrap_or("Unknown");

    let fields = vec![
        field("Branch", &event.ref_name),
        field("Run", &linked(&event.run_url(), &event.run_id)),
        field(
            "Committer",
            event.display_name.as_deref().unwrap_or("Unknown"),
        ),
        field("Message", &linked(&event.change_url, message)),
        field("Change", &linked(&event.change_url, identifier)),
    ];

    SlackMessage {
        channel: channel_id.to_string(),
        ts: prior_handle.map(|handle| handle.as_str().to_string()),
        text: title.clone(),
        blocks: vec![
            SlackBlock::header(title),
            SlackBlock::divider(),
            SlackBlock::section_fields(fields),
            SlackBlock::divider(),
        ],
        attachments: panel.to_attachments(),
    }
}
