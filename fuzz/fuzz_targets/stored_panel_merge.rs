#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use notifier_slack::{
    sync_status_panel, JobOutcome, JobStage, MergePolicy, SlackHistoryMessage, StatusPanel,
};

fuzz_target!(|data: &[u8]| {
    let Some((selector, payload)) = data.split_first() else {
        return;
    };
    let Ok(stored) = serde_json::from_slice::<SlackHistoryMessage>(payload) else {
        return;
    };
    let stage = JobStage::ALL[usize::from(*selector) % JobStage::ALL.len()];
    let outcome = JobOutcome::ALL[usize::from(*selector >> 4) % JobOutcome::ALL.len()];

    let previous = StatusPanel::from_attachments(&stored.attachments);
    assert!(previous.len() <= stored.attachments.len());

    let replaced = sync_status_panel(Some(&previous), stage, outcome, MergePolicy::ReplaceByStage);
    let stages = replaced
        .entries()
        .iter()
        .map(|entry| entry.stage)
        .collect::<HashSet<_>>();
    assert_eq!(stages.len(), replaced.len());
    assert_eq!(
        replaced.entry_for(stage).map(|entry| entry.color.as_str()),
        Some(outcome.color())
    );

    let appended = sync_status_panel(
        Some(&previous),
        stage,
        outcome,
        MergePolicy::AppendWithTimestamp,
    );
    assert_eq!(appended.len(), previous.len() + 1);
});
