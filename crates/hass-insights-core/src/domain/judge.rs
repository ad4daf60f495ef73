//! Judge personas and the verdicts they produce.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named rubric used to score candidates. Rosters are `const` tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JudgePersona {
    pub name: &'static str,
    pub description: &'static str,
    pub focus: &'static str,
}

/// One judge's scored opinion of one candidate.
///
/// `raw_score` is whatever the model put in the `score` field and is only
/// interpreted by [`aggregate_score`](crate::scoring::aggregate_score).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JudgeVerdict {
    pub judge_name: String,
    pub evaluation: String,
    pub raw_score: Value,
}

impl JudgeVerdict {
    pub fn new(judge_name: &str, evaluation: &str, raw_score: Value) -> Self {
        Self {
            judge_name: judge_name.to_string(),
            evaluation: evaluation.to_string(),
            raw_score,
        }
    }
}
