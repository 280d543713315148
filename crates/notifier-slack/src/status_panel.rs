//! Status panel merging: folds one new job outcome into the entries
//! already shown on the message.

use chrono::{DateTime, Utc};

use crate::job_model::{JobOutcome, JobStage};
use crate::slack_wire::{AttachmentField, SlackAttachment};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One rendered status block, keyed by its stage.
pub struct StatusEntry {
    pub stage: JobStage,
    pub color: String,
    pub label: String,
    pub outcome_message: String,
}

impl StatusEntry {
    pub fn new(stage: JobStage, outcome: JobOutcome) -> Self {
        Self {
            stage,
            color: outcome.color().to_string(),
            label: stage.label().to_string(),
            outcome_message: outcome.message().to_string(),
        }
    }

    /// Recovers an entry from a stored attachment. Attachments whose first
    /// field title does not name a known stage yield `None`.
    pub fn from_attachment(attachment: &SlackAttachment) -> Option<Self> {
        let field = attachment.fields.first()?;
        let stage = JobStage::from_label(&field.title)?;
        Some(Self {
            stage,
            color: attachment.color.clone().unwrap_or_default(),
            label: field.title.clone(),
            outcome_message: field.value.clone(),
        })
    }

    pub fn to_attachment(&self) -> SlackAttachment {
        SlackAttachment {
            color: Some(self.color.clone()).filter(|color| !color.is_empty()),
            fields: vec![AttachmentField {
                title: self.label.clone(),
                value: self.outcome_message.clone(),
                short: false,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ordered status entries rendered as the message attachments.
pub struct StatusPanel {
    entries: Vec<StatusEntry>,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<StatusEntry>) -> Self {
        Self { entries }
    }

    /// Rebuilds a panel from stored attachments, dropping any whose stage
    /// cannot be determined.
    pub fn from_attachments(attachments: &[SlackAttachment]) -> Self {
        let entries = attachments
            .iter()
            .filter_map(|attachment| {
                let entry = StatusEntry::from_attachment(attachment);
                if entry.is_none() {
                    tracing::debug!("dropping stored attachment without a known job label");
                }
                entry
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[StatusEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_for(&self, stage: JobStage) -> Option<&StatusEntry> {
        self.entries.iter().find(|entry| entry.stage == stage)
    }

    pub fn to_attachments(&self) -> Vec<SlackAttachment> {
        self.entries.iter().map(StatusEntry::to_attachment).collect()
    }

    fn upsert(&mut self, entry: StatusEntry) {
        match self
            .entries
            .iter_mut()
            .find(|existing| existing.stage == entry.stage)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How a new outcome is combined with the entries already on the message.
pub enum MergePolicy {
    /// One entry per stage; a repeated stage overwrites its existing slot.
    #[default]
    ReplaceByStage,
    /// Every call appends a new entry whose label carries the time.
    AppendWithTimestamp,
}

impl MergePolicy {
    pub fn from_append_flag(append_attachments: bool) -> Self {
        if append_attachments {
            Self::AppendWithTimestamp
        } else {
            Self::ReplaceByStage
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReplaceByStage => "replace_by_stage",
            Self::AppendWithTimestamp => "append_with_timestamp",
        }
    }
}

pub fn decorate_label_with_timestamp(label: &str, now: DateTime<Utc>) -> String {
    format!("{label} ({} UTC)", now.format("%Y-%m-%d %H:%M:%S"))
}

pub fn sync_status_panel(
    previous: Option<&StatusPanel>,
    stage: JobStage,
    outcome: JobOutcome,
    policy: MergePolicy,
) -> StatusPanel {
    sync_status_panel_at(previous, stage, outcome, policy, Utc::now())
}

/// Merges `stage`/`outcome` into `previous` under `policy`, using `now` for
/// timestamp decoration.
pub fn sync_status_panel_at(
    previous: Option<&StatusPanel>,
    stage: JobStage,
    outcome: JobOutcome,
    policy: MergePolicy,
    now: DateTime<Utc>,
) -> StatusPanel {
    let previous_entries = previous.map(StatusPanel::entries).unwrap_or_default();
    let entry = StatusEntry::new(stage, outcome);

    match policy {
        MergePolicy::ReplaceByStage => {
            let mut panel = StatusPanel::new();
            for existing in previous_entries {
                panel.upsert(existing.clone());
            }
            panel.upsert(entry);
            panel
        }
        MergePolicy::AppendWithTimestamp => {
            let mut entries = previous_entries.to_vec();
            entries.push(StatusEntry {
                label: decorate_label_with_timestamp(&entry.label, now),
                ..entry
            });
            StatusPanel::from_entries(entries)
        }
    }
}
