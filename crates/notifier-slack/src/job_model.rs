//! Closed job stage and outcome vocabularies and their wire labels.
//!
//! Stage labels double as the identity of a status entry once rendered:
//! a stored attachment is mapped back to its stage by matching the first
//! field title against [`JobStage::label`]. The label strings are therefore
//! part of the message format and must not change.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown job type '{0}', expected one of: Test, Build, Deploy, PublishDocs")]
/// Raised when a caller names a stage outside the closed [`JobStage`] set.
pub struct UnknownJobStage(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `JobStage` values.
pub enum JobStage {
    Test,
    Build,
    Deploy,
    PublishDocs,
}

impl JobStage {
    pub const ALL: [JobStage; 4] = [
        JobStage::Test,
        JobStage::Build,
        JobStage::Deploy,
        JobStage::PublishDocs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "Test",
            Self::Build => "Build",
            Self::Deploy => "Deploy",
            Self::PublishDocs => "PublishDocs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Test => "Test :test_tube:",
            Self::Build => "Build :building_construction:",
            Self::Deploy => "Deploy :package:",
            Self::PublishDocs => "Publish Docs :jigsaw:",
        }
    }

    /// Reverse label lookup used when re-reading a stored panel. Accepts the
    /// bare label and the timestamp-decorated form `"<label> (<time>)"`,
    /// ignoring ASCII case and a trailing emoji variation selector.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().trim_end_matches('\u{fe0f}');
        Self::ALL
            .into_iter()
            .find(|stage| label_matches(label, stage.label()))
    }
}

fn label_matches(candidate: &str, expected: &str) -> bool {
    if candidate.eq_ignore_ascii_case(expected) {
        return true;
    }
    let Some(prefix) = candidate.get(..expected.len()) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case(expected) {
        return false;
    }
    let suffix = candidate[expected.len()..].trim_start_matches('\u{fe0f}');
    suffix.starts_with(" (") && suffix.ends_with(')')
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStage {
    type Err = UnknownJobStage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownJobStage(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Enumerates supported `JobOutcome` values.
pub enum JobOutcome {
    Progress,
    Success,
    Failure,
    Cancelled,
    Unknown,
}

impl JobOutcome {
    pub const ALL: [JobOutcome; 5] = [
        JobOutcome::Progress,
        JobOutcome::Success,
        JobOutcome::Failure,
        JobOutcome::Cancelled,
        JobOutcome::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Progress => "Progress",
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Progress => "In Progress :construction:",
            Self::Success => "Success :white_check_mark:",
            Self::Failure => "Failure :x:",
            Self::Cancelled => "Cancelled :warning:",
            Self::Unknown => "Something went wrong :question:",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Progress | Self::Unknown => "#DBAB09",
            Self::Success => "#00FF00",
            Self::Failure => "#FF0000",
            Self::Cancelled => "#FFFF00",
        }
    }

    /// Case-insensitive lookup. Unrecognised names degrade to `Unknown`.
    pub fn from_name(value: &str) -> Self {
        let trimmed = value.trim();
        match Self::ALL
            .into_iter()
            .find(|outcome| outcome.as_str().eq_ignore_ascii_case(trimmed))
        {
            Some(outcome) => outcome,
            None => {
                tracing::warn!(job_status = value, "unrecognised job status, using Unknown");
                Self::Unknown
            }
        }
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
