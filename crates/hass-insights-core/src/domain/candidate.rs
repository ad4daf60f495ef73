//! Generated candidates and the outcome of selecting among them.

use serde::{Deserialize, Serialize};

use super::judge::JudgeVerdict;

/// One generated insight text with its panel verdicts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub text: String,
    /// Verdicts in roster order.
    pub verdicts: Vec<JudgeVerdict>,
    pub aggregate_score: f64,
}

impl Candidate {
    /// Build a candidate, computing its aggregate score from `verdicts`.
    pub fn scored(text: String, verdicts: Vec<JudgeVerdict>) -> Self {
        let aggregate_score = crate::scoring::aggregate_score(&verdicts);
        Self {
            text,
            verdicts,
            aggregate_score,
        }
    }
}

/// Output of one best-of-N run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionResult {
    /// Index of the winner in `candidates`.
    pub winner_index: usize,
    /// All candidates in generation order.
    pub candidates: Vec<Candidate>,
}

impl SelectionResult {
    pub fn winner(&self) -> &Candidate {
        &self.candidates[self.winner_index]
    }
}
