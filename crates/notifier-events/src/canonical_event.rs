//! Canonical CI event record built from matched fields plus workflow context.

use std::sync::OnceLock;

use regex::Regex;

use crate::event_schema::{match_event_document, CanonicalFields, EventShape};

pub const DEFAULT_GITHUB_SERVER_URL: &str = "https://github.com";
pub const CHANGE_MESSAGE_MAX_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Static workflow context supplied by the invoking environment, never parsed
/// from the event body.
pub struct EventContext {
    pub repository: String,
    pub ref_name: String,
    pub run_id: String,
    pub workflow: Option<String>,
    pub server_url: String,
}

impl EventContext {
    pub fn new(
        repository: impl Into<String>,
        ref_name: impl Into<String>,
        run_id: impl Into<String>,
        workflow: Option<String>,
    ) -> Self {
        Self {
            repository: repository.into(),
            ref_name: ref_name.into(),
            run_id: run_id.into(),
            workflow,
            server_url: DEFAULT_GITHUB_SERVER_URL.to_string(),
        }
    }

    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into();
        let trimmed = server_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.server_url = trimmed.to_string();
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Normalized CI trigger record, independent of the payload shape it came from.
pub struct CanonicalEvent {
    pub repository: String,
    pub ref_name: String,
    pub run_id: String,
    pub workflow: Option<String>,
    pub display_name: Option<String>,
    pub change_identifier: Option<String>,
    pub change_url: String,
    pub change_message: Option<String>,
    pub server_url: String,
    pub source_shape: EventShape,
}

impl CanonicalEvent {
    /// Matches `raw_json` and merges the result with `context`.
    pub fn from_raw_document(context: EventContext, raw_json: &str) -> Self {
        let matched = match_event_document(raw_json);
        let mut event = Self::from_fields(context, matched.fields);
        event.source_shape = matched.shape;
        event
    }

    pub fn from_fields(context: EventContext, fields: CanonicalFields) -> Self {
        let EventContext {
            repository,
            ref_name,
            run_id,
            workflow,
            server_url,
        } = context;

        let (change_identifier, change_url) = match (fields.sha, fields.pr_url) {
            (Some(sha), _) => {
                let url = format!("{server_url}/{repository}/commit/{sha}");
                (Some(sha), url)
            }
            (None, Some(pr_url)) => (pull_request_identifier(&pr_url), pr_url),
            (None, None) => (None, repository_root_url(&server_url, &repository)),
        };

        Self {
            display_name: fields.display_name.filter(|name| !name.trim().is_empty()),
            change_message: fields.message.as_deref().and_then(sanitize_change_message),
            change_identifier,
            change_url,
            repository,
            ref_name,
            run_id,
            workflow: workflow.filter(|workflow| !workflow.trim().is_empty()),
            server_url,
            source_shape: EventShape::Unmatched,
        }
    }

    pub fn run_url(&self) -> String {
        format!(
            "{}/{}/actions/runs/{}",
            self.server_url, self.repository, self.run_id
        )
    }

    pub fn repository_url(&self) -> String {
        repository_root_url(&self.server_url, &self.repository)
    }
}

fn repository_root_url(server_url: &str, repository: &str) -> String {
    format!("{server_url}/{repository}/")
}

/// Collapses line breaks, strips `<`/`>` so the text cannot break out of
/// Slack link markup, and caps the length. Blank results are dropped.
pub fn sanitize_change_message(message: &str) -> Option<String> {
    let sanitized = message
        .chars()
        .filter(|ch| *ch != '<' && *ch != '>')
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(CHANGE_MESSAGE_MAX_CHARS)
        .collect::<String>();
    if sanitized.trim().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}

/// Extracts the `pull/<number>` segment from a pull request URL.
pub fn pull_request_identifier(url: &str) -> Option<String> {
    static PULL_SEGMENT: OnceLock<Regex> = OnceLock::new();
    let pattern = PULL_SEGMENT.get_or_init(|| {
        Regex::new(r"pull/\d+").unwrap_or_else(|error| panic!("invalid pull pattern: {error}"))
    });
    pattern.find(url).map(|found| found.as_str().to_string())
}
