//! Slack incoming-webhook sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use hass_insights_core::{InsightError, NotificationSink, Result, SlackMessage};

use crate::USER_AGENT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts each message as a header block followed by a markdown section.
#[derive(Debug, Clone)]
pub struct SlackWebhook {
    webhook_url: String,
    http: Client,
}

impl SlackWebhook {
    pub fn new(webhook_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InsightError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            webhook_url: webhook_url.to_string(),
            http,
        })
    }
}

/// Block Kit payload for `message`.
pub fn payload(message: &SlackMessage) -> Value {
    json!({
        "blocks": [
            {
                "type": "header",
                "text": {"type": "plain_text", "text": message.title, "emoji": true}
            },
            {
                "type": "section",
                "text": {"type": "mrkdwn", "text": message.body}
            }
        ]
    })
}

#[async_trait]
impl NotificationSink for SlackWebhook {
    async fn post_message(&self, message: &SlackMessage) -> Result<()> {
        debug!(title = %message.title, "posting to webhook");

        let response = self
            .http
            .post(&self.webhook_url)
            .json(&payload(message))
            .send()
            .await
            .map_err(|e| InsightError::Publish(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InsightError::Publish(format!("HTTP {status}: {body}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_has_header_and_section() {
        let value = payload(&SlackMessage::new("Nest report for upstairs", "🌡️ *Lower* it"));
        let blocks = value["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["type"], "header");
        assert_eq!(blocks[0]["text"]["type"], "plain_text");
        assert_eq!(blocks[0]["text"]["text"], "Nest report for upstairs");
        assert_eq!(blocks[1]["text"]["type"], "mrkdwn");
        assert_eq!(blocks[1]["text"]["text"], "🌡️ *Lower* it");
    }
}
