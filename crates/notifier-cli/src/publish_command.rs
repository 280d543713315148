use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use notifier_events::{CanonicalEvent, EventContext};
use notifier_slack::{
    JobOutcome, JobStage, MergePolicy, MessageBranding, MessageHandle, NotificationSyncClient,
    SlackApiClient, SlackApiConfig,
};

use crate::cli_args::{non_blank, Cli};
use crate::github_output::{OutputSink, MESSAGE_ID_OUTPUT_NAME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JobReport {
    stage: JobStage,
    outcome: JobOutcome,
}

fn resolve_job_report(cli: &Cli) -> Result<JobReport> {
    let stage = cli.job_type.parse::<JobStage>()?;
    let outcome = JobOutcome::from_name(&cli.job_status);
    Ok(JobReport { stage, outcome })
}

fn load_event(cli: &Cli) -> Result<CanonicalEvent> {
    let path = &cli.github_event_path;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload {}", path.display()))?;
    let context = EventContext::new(
        cli.github_repository.trim(),
        cli.github_ref_name.trim(),
        cli.github_run_id.trim(),
        non_blank(Some(cli.github_workflow.as_str())),
    )
    .with_server_url(cli.github_server_url.as_str());
    let event = CanonicalEvent::from_raw_document(context, &raw);
    tracing::debug!(
        shape = event.source_shape.as_str(),
        change = event.change_identifier.as_deref().unwrap_or("none"),
        "loaded github event"
    );
    Ok(event)
}

fn build_sync_client(cli: &Cli) -> Result<NotificationSyncClient> {
    let channel_id = cli.slack_channel_id.trim();
    if channel_id.is_empty() {
        bail!("--slack-channel-id must not be empty");
    }
    let transport = SlackApiClient::new(SlackApiConfig {
        api_base: cli.slack_api_base.clone(),
        bot_token: cli.slack_token.clone(),
        request_timeout_ms: cli.request_timeout_ms,
    })
    .context("failed to create slack api client")?;
    let branding = MessageBranding::new(
        non_blank(cli.service_name.as_deref()),
        non_blank(cli.service_emoji.as_deref()),
    );
    Ok(NotificationSyncClient::new(
        Arc::new(transport),
        channel_id,
        branding,
        MergePolicy::from_append_flag(cli.append_attachments),
    ))
}

/// Runs one publish and records the resulting handle. Nothing is written to
/// the output sink unless the publish succeeds.
pub(crate) async fn run_publish(cli: Cli) -> Result<()> {
    let report = resolve_job_report(&cli)?;
    let event = load_event(&cli)?;
    let client = build_sync_client(&cli)?;
    let prior_handle = MessageHandle::from_optional(cli.slack_message_id.as_deref());

    let handle = client
        .publish(&event, report.stage, report.outcome, prior_handle.as_ref())
        .await
        .context("failed to publish slack status message")?;

    let sink = OutputSink::from_path(cli.github_output.clone());
    if let Err(error) = sink.write_output(MESSAGE_ID_OUTPUT_NAME, handle.as_str()) {
        tracing::warn!(error = %error, "failed to record slack message id output");
    }
    Ok(())
}
