//! Per-run counters.
//!
//! A [`RunMetrics`] tally is built by the report flow as stages complete and
//! returned on the [`RunOutcome`](crate::reports::RunOutcome). It is reported
//! once, as a single `run.metrics` event, when the run finishes.

use serde::Serialize;
use tracing::info;

use crate::domain::SelectionResult;

/// Model calls and posts made by one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunMetrics {
    pub generation_calls: usize,
    pub evaluation_calls: usize,
    pub messages_published: usize,
}

impl RunMetrics {
    /// One single-candidate draft.
    pub fn record_draft(&mut self) {
        self.generation_calls += 1;
    }

    /// A best-of-N selection: one draw per candidate, one call per verdict.
    pub fn record_selection(&mut self, selection: &SelectionResult) {
        self.generation_calls += selection.candidates.len();
        self.evaluation_calls += selection
            .candidates
            .iter()
            .map(|c| c.verdicts.len())
            .sum::<usize>();
    }

    pub fn record_published(&mut self) {
        self.messages_published += 1;
    }

    pub fn flush(&self, run_id: &str) {
        info!(
            event = "run.metrics",
            run_id = %run_id,
            generation_calls = self.generation_calls,
            evaluation_calls = self.evaluation_calls,
            messages_published = self.messages_published,
        );
    }
}
