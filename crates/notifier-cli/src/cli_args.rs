use std::path::PathBuf;

use clap::Parser;
use notifier_events::DEFAULT_GITHUB_SERVER_URL;
use notifier_slack::DEFAULT_SLACK_API_BASE;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "slack-notifier",
    about = "Posts and updates a single Slack CI status message across workflow stages",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "github-event-path",
        env = "GITHUB_EVENT_PATH",
        help = "Path to the JSON payload of the triggering GitHub event"
    )]
    pub(crate) github_event_path: PathBuf,

    #[arg(
        long = "github-repository",
        env = "GITHUB_REPOSITORY",
        help = "Repository in owner/name form"
    )]
    pub(crate) github_repository: String,

    #[arg(long = "github-run-id", env = "GITHUB_RUN_ID", help = "Workflow run id")]
    pub(crate) github_run_id: String,

    #[arg(
        long = "github-workflow",
        env = "GITHUB_WORKFLOW",
        help = "Workflow name shown in the message title"
    )]
    pub(crate) github_workflow: String,

    #[arg(
        long = "github-ref-name",
        env = "GITHUB_REF_NAME",
        help = "Branch or tag the run was triggered for"
    )]
    pub(crate) github_ref_name: String,

    #[arg(
        long = "github-server-url",
        env = "GITHUB_SERVER_URL",
        default_value = DEFAULT_GITHUB_SERVER_URL,
        help = "Base URL for run, commit and repository links"
    )]
    pub(crate) github_server_url: String,

    #[arg(
        long = "service-name",
        env = "PUBLISH_SLACK_SERVICE_NAME",
        help = "Service name used in the title instead of the repository name"
    )]
    pub(crate) service_name: Option<String>,

    #[arg(
        long = "service-emoji",
        env = "PUBLISH_SLACK_SERVICE_EMOJI",
        help = "Emoji prefixed to the title"
    )]
    pub(crate) service_emoji: Option<String>,

    #[arg(
        long = "job-type",
        env = "PUBLISH_SLACK_JOB_TYPE",
        help = "Pipeline stage: Test, Build, Deploy or PublishDocs"
    )]
    pub(crate) job_type: String,

    #[arg(
        long = "job-status",
        env = "PUBLISH_SLACK_JOB_STATUS",
        help = "Stage outcome: Progress, Success, Failure or Cancelled"
    )]
    pub(crate) job_status: String,

    #[arg(
        long = "slack-token",
        env = "SLACK_APP_TOKEN",
        hide_env_values = true,
        help = "Slack bot token for Web API (xoxb-...)"
    )]
    pub(crate) slack_token: String,

    #[arg(
        long = "slack-channel-id",
        env = "SLACK_CHANNEL_ID",
        help = "Channel holding the status message"
    )]
    pub(crate) slack_channel_id: String,

    #[arg(
        long = "slack-message-id",
        env = "SLACK_MESSAGE_ID",
        help = "Timestamp of the status message to update; omitted to post a new one"
    )]
    pub(crate) slack_message_id: Option<String>,

    #[arg(
        long = "append-attachments",
        env = "PUBLISH_SLACK_APPEND_ATTACHMENTS",
        default_value_t = false,
        help = "Append a timestamped status entry instead of replacing the stage's entry"
    )]
    pub(crate) append_attachments: bool,

    #[arg(
        long = "slack-api-base",
        env = "SLACK_API_BASE",
        default_value = DEFAULT_SLACK_API_BASE,
        help = "Slack Web API base URL"
    )]
    pub(crate) slack_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "PUBLISH_SLACK_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout applied to each Slack API request"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "github-output",
        env = "GITHUB_OUTPUT",
        help = "File receiving SLACK_MESSAGE_ID; printed as a workflow command when unset"
    )]
    pub(crate) github_output: Option<PathBuf>,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
