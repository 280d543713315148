use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use httpmock::prelude::*;
use notifier_events::{CanonicalEvent, CanonicalFields, EventContext};
use notifier_slack::{
    JobOutcome, JobStage, MergePolicy, MessageBranding, MessageHandle, NotificationSyncClient,
    SlackApiClient, SlackApiConfig, SlackHistoryMessage, SlackMessage, SlackPostedMessage,
    SlackTransport, SlackTransportError,
};
use serde_json::json;
use tokio::sync::Mutex as AsyncMutex;

/// Channel double that keeps posted messages and serves them back through
/// history, the way Slack round-trips attachments.
#[derive(Default)]
struct InMemoryChannel {
    next_ts: AtomicU64,
    messages: AsyncMutex<BTreeMap<String, SlackMessage>>,
    fail_history: AtomicBool,
    history_calls: AtomicU64,
}

impl InMemoryChannel {
    async fn stored(&self, handle: &MessageHandle) -> SlackMessage {
        self.messages
            .lock()
            .await
            .get(handle.as_str())
            .cloned()
            .expect("stored message")
    }

    async fn message_count(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl SlackTransport for InMemoryChannel {
    async fn post_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError> {
        let ts = format!(
            "1700000000.{:06}",
            self.next_ts.fetch_add(1, Ordering::SeqCst) + 1
        );
        let mut stored = message.clone();
        stored.ts = Some(ts.clone());
        self.messages.lock().await.insert(ts.clone(), stored);
        Ok(SlackPostedMessage {
            channel: Some(message.channel.clone()),
            ts: Some(ts),
        })
    }

    async fn update_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError> {
        let ts = message.ts.clone().unwrap_or_default();
        let mut messages = self.messages.lock().await;
        if !messages.contains_key(&ts) {
            return Err(SlackTransportError::Api {
                method: "chat.update",
                error: "message_not_found".to_string(),
            });
        }
        messages.insert(ts.clone(), message.clone());
        Ok(SlackPostedMessage {
            channel: Some(message.channel.clone()),
            ts: Some(ts),
        })
    }

    async fn fetch_history(
        &self,
        _channel: &str,
        oldest: &str,
        limit: usize,
    ) -> Result<Vec<SlackHistoryMessage>, SlackTransportError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_history.load(Ordering::SeqCst) {
            return Err(SlackTransportError::HttpStatus {
                method: "conversations.history",
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        let messages = self.messages.lock().await;
        messages
            .range(oldest.to_string()..)
            .take(limit)
            .map(|(_, message)| {
                let encoded = serde_json::to_value(message)?;
                Ok(serde_json::from_value::<SlackHistoryMessage>(encoded)?)
            })
            .collect()
    }
}

fn push_event() -> CanonicalEvent {
    CanonicalEvent::from_raw_document(
        EventContext::new(
            "monta-app/service-integrations",
            "develop",
            "4399287439",
            Some("Deploy Dev".to_string()),
        ),
        r#"{"head_commit":{"id":"abc123","message":"fix: bug"},"pusher":{"name":"alice"}}"#,
    )
}

fn sync_client(channel: Arc<InMemoryChannel>, policy: MergePolicy) -> NotificationSyncClient {
    NotificationSyncClient::new(channel, "C1", MessageBranding::default(), policy)
}

fn titles(message: &SlackMessage) -> Vec<String> {
    message
        .attachments
        .iter()
        .map(|attachment| attachment.fields[0].title.clone())
        .collect()
}

#[tokio::test]
async fn integration_replace_policy_converges_on_one_entry_per_stage() {
    let channel = Arc::new(InMemoryChannel::default());
    let client = sync_client(channel.clone(), MergePolicy::ReplaceByStage);
    let event = push_event();

    let first = client
        .publish(&event, JobStage::Test, JobOutcome::Progress, None)
        .await
        .expect("create");
    let stored = channel.stored(&first).await;
    assert_eq!(stored.attachments.len(), 1);
    assert_eq!(stored.attachments[0].color.as_deref(), Some("#DBAB09"));

    let second = client
        .publish(&event, JobStage::Test, JobOutcome::Success, Some(&first))
        .await
        .expect("update");
    assert_eq!(second, first);
    assert_eq!(channel.message_count().await, 1);

    let stored = channel.stored(&first).await;
    assert_eq!(titles(&stored), vec!["Test :test_tube:"]);
    assert_eq!(stored.attachments[0].color.as_deref(), Some("#00FF00"));
    assert_eq!(
        stored.attachments[0].fields[0].value,
        "Success :white_check_mark:"
    );
}

#[tokio::test]
async fn integration_replace_policy_keeps_stage_order_across_pipeline() {
    let channel = Arc::new(InMemoryChannel::default());
    let client = sync_client(channel.clone(), MergePolicy::ReplaceByStage);
    let event = push_event();

    let handle = client
        .publish(&event, JobStage::Test, JobOutcome::Success, None)
        .await
        .expect("test");
    for (stage, outcome) in [
        (JobStage::Build, JobOutcome::Progress),
        (JobStage::Build, JobOutcome::Success),
        (JobStage::Deploy, JobOutcome::Failure),
        (JobStage::Build, JobOutcome::Cancelled),
    ] {
        client
            .publish(&event, stage, outcome, Some(&handle))
            .await
            .expect("update");
    }

    let stored = channel.stored(&handle).await;
    assert_eq!(
        titles(&stored),
        vec![
            "Test :test_tube:",
            "Build :building_construction:",
            "Deploy :package:"
        ]
    );
    assert_eq!(stored.attachments[1].fields[0].value, "Cancelled :warning:");
    assert_eq!(stored.attachments[2].color.as_deref(), Some("#FF0000"));
}

#[tokio::test]
async fn integration_append_policy_grows_panel_with_each_call() {
    let channel = Arc::new(InMemoryChannel::default());
    let client = sync_client(channel.clone(), MergePolicy::AppendWithTimestamp);
    let event = push_event();

    let handle = client
        .publish(&event, JobStage::Test, JobOutcome::Progress, None)
        .await
        .expect("create");
    client
        .publish(&event, JobStage::Test, JobOutcome::Success, Some(&handle))
        .await
        .expect("update");
    assert_eq!(channel.stored(&handle).await.attachments.len(), 2);

    client
        .publish(&event, JobStage::Build, JobOutcome::Success, Some(&handle))
        .await
        .expect("update");
    let stored = channel.stored(&handle).await;
    let titles = titles(&stored);
    assert_eq!(titles.len(), 3);
    assert!(titles.iter().all(|title| title.ends_with(" UTC)")));
    assert!(titles[2].starts_with("Build :building_construction: ("));
}

#[tokio::test]
async fn integration_history_failure_rebuilds_panel_and_still_updates() {
    let channel = Arc::new(InMemoryChannel::default());
    let client = sync_client(channel.clone(), MergePolicy::ReplaceByStage);
    let event = push_event();

    let handle = client
        .publish(&event, JobStage::Test, JobOutcome::Success, None)
        .await
        .expect("create");
    channel.fail_history.store(true, Ordering::SeqCst);

    let updated = client
        .publish(&event, JobStage::Deploy, JobOutcome::Progress, Some(&handle))
        .await
        .expect("update despite history failure");
    assert_eq!(updated, handle);
    assert_eq!(channel.history_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        titles(&channel.stored(&handle).await),
        vec!["Deploy :package:"]
    );
}

#[tokio::test]
async fn integration_pull_request_event_renders_pull_identifier() {
    let channel = Arc::new(InMemoryChannel::default());
    let client = sync_client(channel.clone(), MergePolicy::ReplaceByStage);
    let event = CanonicalEvent::from_fields(
        EventContext::new("x/y", "feature", "9", Some("CI".to_string())),
        CanonicalFields {
            display_name: Some("bob".to_string()),
            pr_url: Some("https://x/y/pull/42".to_string()),
            ..CanonicalFields::default()
        },
    );
    assert_eq!(event.change_identifier.as_deref(), Some("pull/42"));
    assert_eq!(event.change_url, "https://x/y/pull/42");

    let handle = client
        .publish(&event, JobStage::Build, JobOutcome::Success, None)
        .await
        .expect("create");
    let stored = channel.stored(&handle).await;
    let fields = stored.blocks[2].fields.as_ref().expect("section fields");
    assert_eq!(fields[4].text, " \n*Change:*\n<https://x/y/pull/42|pull/42>");
    assert_eq!(
        fields[3].text,
        " \n*Message:*\n<https://x/y/pull/42|No message>"
    );
}

#[tokio::test]
async fn integration_slack_api_client_updates_message_recovered_from_history() {
    let server = MockServer::start();
    let history = server.mock(|when, then| {
        when.method(GET)
            .path("/conversations.history")
            .header("authorization", "Bearer xoxb-test")
            .query_param("channel", "C1")
            .query_param("oldest", "1700000000.000100")
            .query_param("inclusive", "true")
            .query_param("limit", "1");
        then.status(200).json_body(json!({
            "ok": true,
            "messages": [{
                "type": "message",
                "ts": "1700000000.000100",
                "attachments": [{
                    "id": 1,
                    "color": "DBAB09",
                    "fields": [{"title": "Test :test_tube:", "value": "In Progress :construction:", "short": false}]
                }]
            }]
        }));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/chat.update")
            .body_includes("\"ts\":\"1700000000.000100\"")
            .body_includes("\"color\":\"#00FF00\"")
            .body_includes("Success :white_check_mark:");
        then.status(200).json_body(json!({
            "ok": true,
            "channel": "C1",
            "ts": "1700000000.000100"
        }));
    });

    let transport = SlackApiClient::new(SlackApiConfig {
        api_base: server.base_url(),
        bot_token: "xoxb-test".to_string(),
        request_timeout_ms: 2_000,
    })
    .expect("client");
    let client = NotificationSyncClient::new(
        Arc::new(transport),
        "C1",
        MessageBranding::new(Some("Integrations".to_string()), Some(":zap:".to_string())),
        MergePolicy::ReplaceByStage,
    );
    let prior = MessageHandle::new("1700000000.000100");

    let handle = client
        .publish(&push_event(), JobStage::Test, JobOutcome::Success, Some(&prior))
        .await
        .expect("update");
    assert_eq!(handle, prior);
    assert_eq!(history.calls(), 1);
    assert_eq!(update.calls(), 1);
}

#[tokio::test]
async fn integration_slack_api_client_history_error_still_updates() {
    let server = MockServer::start();
    let history = server.mock(|when, then| {
        when.method(GET).path("/conversations.history");
        then.status(200)
            .json_body(json!({"ok": false, "error": "missing_scope"}));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/chat.update")
            .body_includes("Deploy :package:");
        then.status(200)
            .json_body(json!({"ok": true, "channel": "C1", "ts": "5.5"}));
    });

    let transport = SlackApiClient::new(SlackApiConfig {
        api_base: server.base_url(),
        bot_token: "xoxb-test".to_string(),
        request_timeout_ms: 2_000,
    })
    .expect("client");
    let client = NotificationSyncClient::new(
        Arc::new(transport),
        "C1",
        MessageBranding::default(),
        MergePolicy::ReplaceByStage,
    );

    let handle = client
        .publish(
            &push_event(),
            JobStage::Deploy,
            JobOutcome::Success,
            Some(&MessageHandle::new("5.5")),
        )
        .await
        .expect("update");
    assert_eq!(handle.as_str(), "5.5");
    assert_eq!(history.calls(), 1);
    assert_eq!(update.calls(), 1);
}
