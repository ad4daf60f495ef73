//! Error taxonomy for insight runs.

/// Errors reported by a [`TextModel`](crate::clients::TextModel) implementation.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate limited by model API")]
    RateLimited,

    #[error("could not decode model response: {0}")]
    Parse(String),

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Errors that terminate an insight run.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("failed to fetch history for {entity_id}: {reason}")]
    Fetch { entity_id: String, reason: String },

    #[error("candidate {index} generation failed: {source}")]
    Generation {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error("unexpected {stage} reply: {detail}")]
    UnexpectedReply { stage: &'static str, detail: String },

    #[error("judge {judge} call failed: {source}")]
    Evaluation {
        judge: String,
        #[source]
        source: ModelError,
    },

    #[error("judge {judge} returned a malformed verdict: {reason}")]
    MalformedVerdict { judge: String, reason: String },

    #[error("judge panel incomplete: expected {expected} verdicts, got {actual}")]
    IncompletePanel { expected: usize, actual: usize },

    #[error("cannot select from an empty candidate list")]
    EmptyInput,

    #[error("failed to publish report: {0}")]
    Publish(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("concurrent task failed: {0}")]
    TaskFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InsightError {
    /// Pipeline stage the error belongs to, for the terminal diagnostic.
    pub fn stage(&self) -> &'static str {
        match self {
            InsightError::Fetch { .. } => "fetch",
            InsightError::Generation { .. } => "generate",
            InsightError::UnexpectedReply { stage, .. } => stage,
            InsightError::Evaluation { .. }
            | InsightError::MalformedVerdict { .. }
            | InsightError::IncompletePanel { .. } => "evaluate",
            InsightError::EmptyInput => "select",
            InsightError::Publish(_) => "publish",
            InsightError::Config(_) => "config",
            InsightError::TaskFailed(_) | InsightError::Serialization(_) => "runtime",
        }
    }
}

/// Result type for insight operations.
pub type Result<T> = std::result::Result<T, InsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = InsightError::Fetch {
            entity_id: "sensor.time_at_work".to_string(),
            reason: "HTTP 401".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("sensor.time_at_work"));
        assert!(msg.contains("HTTP 401"));
        assert_eq!(err.stage(), "fetch");
    }

    #[test]
    fn test_verdict_errors_map_to_evaluate_stage() {
        let malformed = InsightError::MalformedVerdict {
            judge: "Productivity Coach".to_string(),
            reason: "missing field `evaluation`".to_string(),
        };
        assert_eq!(malformed.stage(), "evaluate");

        let incomplete = InsightError::IncompletePanel {
            expected: 7,
            actual: 6,
        };
        assert_eq!(incomplete.stage(), "evaluate");
        assert!(incomplete.to_string().contains("expected 7"));
    }

    #[test]
    fn test_generation_error_keeps_source() {
        let err = InsightError::Generation {
            index: 2,
            source: ModelError::Status {
                status: 500,
                body: "upstream".to_string(),
            },
        };
        assert_eq!(err.stage(), "generate");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_unexpected_reply_uses_its_stage() {
        let err = InsightError::UnexpectedReply {
            stage: "generate",
            detail: "tool call instead of text".to_string(),
        };
        assert_eq!(err.stage(), "generate");
    }
}
