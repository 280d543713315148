//! Structural matching of raw GitHub event documents.
//!
//! Each supported shape is a strict serde model of the fields it needs.
//! A document that fails to decode into a shape, or whose discriminator
//! does not hold, is simply not that shape. Shapes are tried in a fixed
//! priority order and the first positive match wins.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Partial record extracted from a raw event document.
pub struct CanonicalFields {
    pub display_name: Option<String>,
    pub sha: Option<String>,
    pub message: Option<String>,
    pub pr_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `EventShape` values.
pub enum EventShape {
    Push,
    PullRequestOpened,
    IssueCreated,
    TrunkMerge,
    Unmatched,
}

impl EventShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::PullRequestOpened => "pull_request_opened",
            Self::IssueCreated => "issue_created",
            Self::TrunkMerge => "trunk_merge",
            Self::Unmatched => "unmatched",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of matching one raw document: which shape won and what it yielded.
pub struct SchemaMatch {
    pub shape: EventShape,
    pub fields: CanonicalFields,
}

impl SchemaMatch {
    fn unmatched() -> Self {
        Self {
            shape: EventShape::Unmatched,
            fields: CanonicalFields::default(),
        }
    }
}

type ShapeParser = fn(&Value) -> Option<CanonicalFields>;

const SHAPE_PARSERS: [(EventShape, ShapeParser); 4] = [
    (EventShape::Push, parse_push),
    (EventShape::PullRequestOpened, parse_pull_request_opened),
    (EventShape::IssueCreated, parse_issue_created),
    (EventShape::TrunkMerge, parse_trunk_merge),
];

/// Matches `raw_json` against the known event shapes. Never fails: invalid
/// JSON or an unrecognised document yields [`EventShape::Unmatched`] with
/// every field absent.
pub fn match_event_document(raw_json: &str) -> SchemaMatch {
    let document = match serde_json::from_str::<Value>(raw_json) {
        Ok(document) => document,
        Err(error) => {
            tracing::debug!(%error, "event document is not valid json");
            return SchemaMatch::unmatched();
        }
    };

    for (shape, parser) in SHAPE_PARSERS {
        if let Some(fields) = parser(&document) {
            tracing::debug!(shape = shape.as_str(), "event document matched");
            return SchemaMatch { shape, fields };
        }
    }

    tracing::debug!("event document matched no known shape");
    SchemaMatch::unmatched()
}

fn decode_shape<T: DeserializeOwned>(document: &Value) -> Option<T> {
    T::deserialize(document).ok()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct GithubActor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl GithubActor {
    fn display_name(self) -> Option<String> {
        non_blank(self.name)
            .or_else(|| non_blank(self.username))
            .or_else(|| non_blank(self.email))
    }
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct PushDocument {
    head_commit: PushCommit,
    pusher: GithubActor,
}

#[derive(Debug, Deserialize)]
struct PushCommit {
    id: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    committer: Option<GithubActor>,
}

fn parse_push(document: &Value) -> Option<CanonicalFields> {
    let push: PushDocument = decode_shape(document)?;
    let committer_name = push.head_commit.committer.and_then(GithubActor::display_name);
    Some(CanonicalFields {
        display_name: push.pusher.display_name().or(committer_name),
        sha: non_blank(Some(push.head_commit.id)),
        message: push.head_commit.message,
        pr_url: None,
    })
}

#[derive(Debug, Deserialize)]
struct PullRequestOpenedDocument {
    action: String,
    pull_request: OpenedPullRequest,
}

#[derive(Debug, Deserialize)]
struct OpenedPullRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    head: Option<PullRequestHead>,
    #[serde(default)]
    user: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
struct PullRequestHead {
    #[serde(default)]
    sha: Option<String>,
}

fn parse_pull_request_opened(document: &Value) -> Option<CanonicalFields> {
    let opened: PullRequestOpenedDocument = decode_shape(document)?;
    if opened.action != "opened" {
        return None;
    }
    let pull_request = opened.pull_request;
    Some(CanonicalFields {
        display_name: pull_request.user.map(|user| user.login),
        sha: non_blank(pull_request.head.and_then(|head| head.sha)),
        message: pull_request.title,
        pr_url: non_blank(pull_request.html_url),
    })
}

#[derive(Debug, Deserialize)]
struct IssueCreatedDocument {
    action: String,
    issue: CreatedIssue,
    #[serde(default)]
    sender: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
}

fn parse_issue_created(document: &Value) -> Option<CanonicalFields> {
    let created: IssueCreatedDocument = decode_shape(document)?;
    if created.action != "created" {
        return None;
    }
    Some(CanonicalFields {
        display_name: created.sender.map(|sender| sender.login),
        sha: None,
        message: created.issue.title,
        pr_url: non_blank(created.issue.html_url),
    })
}

#[derive(Debug, Deserialize)]
struct TrunkMergeDocument {
    after: String,
    pull_request: TrunkPullRequest,
}

#[derive(Debug, Deserialize)]
struct TrunkPullRequest {
    #[allow(dead_code)]
    head: TrunkPullRequestHead,
    title: String,
    user: GithubUser,
}

// Only required to be present; the head ref separates merges from bare PR payloads.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TrunkPullRequestHead {
    #[serde(rename = "ref")]
    ref_name: String,
}

fn parse_trunk_merge(document: &Value) -> Option<CanonicalFields> {
    let merge: TrunkMergeDocument = decode_shape(document)?;
    Some(CanonicalFields {
        display_name: Some(merge.pull_request.user.login),
        sha: non_blank(Some(merge.after)),
        message: Some(merge.pull_request.title),
        pr_url: None,
    })
}
