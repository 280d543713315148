//! Slack Web API client for the three calls the notifier makes.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::slack_transport::{SlackPostedMessage, SlackTransport, SlackTransportError};
use crate::slack_wire::{SlackHistoryMessage, SlackMessage};

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
const ERROR_BODY_MAX_CHARS: usize = 320;

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackHistoryResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<SlackHistoryMessage>,
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Connection settings for [`SlackApiClient`].
pub struct SlackApiConfig {
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
}

impl SlackApiConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_SLACK_API_BASE.to_string(),
            bot_token: bot_token.into(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Clone)]
/// `reqwest`-backed [`SlackTransport`]. Every call is a single attempt.
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl SlackApiClient {
    pub fn new(config: SlackApiConfig) -> Result<Self, SlackTransportError> {
        let bot_token = config.bot_token.trim().to_string();
        if bot_token.is_empty() {
            return Err(SlackTransportError::InvalidConfig(
                "slack bot token must not be empty".to_string(),
            ));
        }
        let api_base = config.api_base.trim().trim_end_matches('/').to_string();
        if api_base.is_empty() {
            return Err(SlackTransportError::InvalidConfig(
                "slack api base url must not be empty".to_string(),
            ));
        }
        if config.request_timeout_ms == 0 {
            return Err(SlackTransportError::InvalidConfig(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("slack-notifier"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            api_base,
            bot_token,
        })
    }

    async fn send_chat_message(
        &self,
        method: &'static str,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError> {
        let request = self
            .http
            .post(format!("{}/{method}", self.api_base))
            .bearer_auth(&self.bot_token)
            .json(message);
        let response: SlackChatMessageResponse = self.request_json(method, request).await?;
        if !response.ok {
            return Err(api_error(method, response.error));
        }
        Ok(SlackPostedMessage {
            channel: response.channel,
            ts: response.ts.filter(|ts| !ts.trim().is_empty()),
        })
    }

    async fn request_json<T>(
        &self,
        method: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, SlackTransportError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SlackTransportError::HttpStatus {
                method,
                status: status.as_u16(),
                body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
            });
        }
        Ok(serde_json::from_str::<T>(&body)?)
    }
}

#[async_trait]
impl SlackTransport for SlackApiClient {
    async fn post_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError> {
        self.send_chat_message("chat.postMessage", message).await
    }

    async fn update_message(
        &self,
        message: &SlackMessage,
    ) -> Result<SlackPostedMessage, SlackTransportError> {
        self.send_chat_message("chat.update", message).await
    }

    async fn fetch_history(
        &self,
        channel: &str,
        oldest: &str,
        limit: usize,
    ) -> Result<Vec<SlackHistoryMessage>, SlackTransportError> {
        const METHOD: &str = "conversations.history";
        let limit = limit.max(1).to_string();
        let request = self
            .http
            .get(format!("{}/{METHOD}", self.api_base))
            .bearer_auth(&self.bot_token)
            .query(&[
                ("channel", channel),
                ("oldest", oldest),
                ("inclusive", "true"),
                ("limit", limit.as_str()),
            ]);
        let response: SlackHistoryResponse = self.request_json(METHOD, request).await?;
        if !response.ok {
            return Err(api_error(METHOD, response.error));
        }
        Ok(response.messages)
    }
}

fn api_error(method: &'static str, error: Option<String>) -> SlackTransportError {
    SlackTransportError::Api {
        method,
        error: error
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| "unknown error".to_string()),
    }
}

fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}
