//! Delivery of finished reports to the notification sink.

use std::sync::Arc;

use crate::clients::{NotificationSink, SlackMessage};
use crate::domain::Result;
use crate::obs::emit_report_published;

/// Posts titled reports. One call, no retries; failures surface to the caller.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn NotificationSink>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub async fn publish(&self, title: &str, body: &str) -> Result<()> {
        self.sink.post_message(&SlackMessage::new(title, body)).await?;
        emit_report_published(title, body.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InsightError;
    use crate::fakes::RecordingSink;

    #[tokio::test]
    async fn test_publish_posts_one_message() {
        let sink = Arc::new(RecordingSink::new());
        let reporter = Reporter::new(sink.clone());
        reporter.publish("Time at work vs home", "👍 nice").await.unwrap();
        assert_eq!(
            sink.messages(),
            vec![SlackMessage::new("Time at work vs home", "👍 nice")]
        );
    }

    #[tokio::test]
    async fn test_rejection_surfaces_publish_error() {
        let reporter = Reporter::new(Arc::new(RecordingSink::rejecting()));
        let err = reporter.publish("t", "b").await.unwrap_err();
        assert!(matches!(err, InsightError::Publish(_)));
        assert_eq!(err.stage(), "publish");
    }
}
