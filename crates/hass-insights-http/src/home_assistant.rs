//! Home Assistant history client
//!
//! Calls `GET {base}/api/history/period/{start}?filter_entity_id=..&end_time=..`
//! with a long-lived access token. The hub answers with one array of state
//! records per matching entity.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone};
use reqwest::{header, Client};
use tracing::debug;

use hass_insights_core::{EntityHistory, HistoryClient, HistoryWindow, InsightError, Result};

use crate::USER_AGENT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// History client for one Home Assistant instance.
#[derive(Debug, Clone)]
pub struct HomeAssistantClient {
    base_url: String,
    token: String,
    http: Client,
}

impl HomeAssistantClient {
    /// Create a client for the hub at `base_url` (e.g. `http://homeassistant.local:8123`).
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InsightError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn history_url(&self, window: &HistoryWindow) -> String {
        format!(
            "{}/api/history/period/{}",
            self.base_url,
            timestamp(&window.start)
        )
    }
}

/// ISO-8601 with milliseconds and the local offset, e.g. `2024-05-01T00:00:00.000-07:00`.
fn timestamp<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    instant
        .fixed_offset()
        .to_rfc3339_opts(SecondsFormat::Millis, false)
}

#[async_trait]
impl HistoryClient for HomeAssistantClient {
    async fn fetch_history(&self, entity_id: &str, window: &HistoryWindow) -> Result<EntityHistory> {
        let fetch_error = |reason: String| InsightError::Fetch {
            entity_id: entity_id.to_string(),
            reason,
        };

        let url = self.history_url(window);
        debug!(entity_id, url = %url, "fetching history");

        let response = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::CONTENT_TYPE, "application/json")
            .query(&[
                ("filter_entity_id", entity_id.to_string()),
                ("end_time", timestamp(&window.end)),
            ])
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fetch_error(format!("HTTP {status}: {body}")));
        }

        response
            .json::<EntityHistory>()
            .await
            .map_err(|e| fetch_error(format!("invalid history payload: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_timestamp_keeps_local_offset_and_millis() {
        let tz: chrono_tz::Tz = "America/Los_Angeles".parse().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 3, 2, 0, 0).unwrap();
        let window = HistoryWindow::ending_today(now, tz, 1);
        assert_eq!(timestamp(&window.start), "2024-05-01T00:00:00.000-07:00");
        assert_eq!(timestamp(&window.end), "2024-05-02T23:59:59.999-07:00");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = HomeAssistantClient::new("http://hass.local:8123/", "t").unwrap();
        assert_eq!(client.base_url(), "http://hass.local:8123");
    }
}
