//! Structured observability hooks for insight runs.
//!
//! This module provides:
//! - A run-scoped tracing span via [`run_span`]
//! - Emission functions for the pipeline stages: fetch, generate, score,
//!   select, publish, finish
//!
//! Events are emitted at `info!` level (per-judge detail at `debug!`),
//! filterable through `RUST_LOG`. Pass `--json` for JSON output.

use tracing::{debug, info, warn};

use crate::domain::Candidate;

/// Run-scoped span carrying the run id and report kind.
///
/// Attach it to the run future with `tracing::Instrument` so every event
/// emitted while the run is in flight carries both fields.
///
/// # Example
///
/// ```ignore
/// runner.run(&kind, now).instrument(run_span(&run_id, "work-home")).await
/// ```
pub fn run_span(run_id: &str, report: &str) -> tracing::Span {
    tracing::info_span!("insights.run", run_id = %run_id, report = %report)
}

/// Emit event: run started.
pub fn emit_run_started(run_id: &str, report: &str) {
    info!(event = "run.started", run_id = %run_id, report = %report);
}

/// Emit event: history fetched for one entity.
pub fn emit_history_fetched(entity_id: &str, records: usize) {
    info!(event = "history.fetched", entity_id = %entity_id, records = records);
}

/// Emit event: candidate batch generated.
pub fn emit_candidates_generated(count: usize) {
    info!(event = "candidates.generated", count = count);
}

/// Emit event: one candidate fully scored, with every verdict at debug level.
pub fn emit_candidate_scored(index: usize, candidate: &Candidate) {
    info!(
        event = "candidate.scored",
        candidate = index + 1,
        average = %format!("{:.2}", candidate.aggregate_score),
        verdicts = candidate.verdicts.len(),
    );
    debug!(candidate = index + 1, text = %candidate.text, "candidate text");
    for verdict in &candidate.verdicts {
        debug!(
            candidate = index + 1,
            judge = %verdict.judge_name,
            score = %verdict.raw_score,
            evaluation = %verdict.evaluation,
            "verdict"
        );
    }
}

/// Emit event: winner chosen.
pub fn emit_winner_selected(index: usize, average: f64, candidates: usize) {
    info!(
        event = "winner.selected",
        candidate = index + 1,
        average = %format!("{:.2}", average),
        candidates = candidates,
    );
}

/// Emit event: report delivered to the sink.
pub fn emit_report_published(title: &str, chars: usize) {
    info!(event = "report.published", title = %title, chars = chars);
}

/// Emit event: report skipped because there was nothing to say.
pub fn emit_report_skipped(title: &str, reason: &str) {
    info!(event = "report.skipped", title = %title, reason = %reason);
}

/// Emit event: run finished.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, published: usize) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        published = published,
    );
}

/// Emit event: run failed at `stage` (warning level).
pub fn emit_run_failed(run_id: &str, stage: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, stage = %stage, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JudgeVerdict;

    #[test]
    fn test_run_span_enter() {
        let span = run_span("test-run-id", "hvac");
        let _guard = span.enter();
        emit_run_started("test-run-id", "hvac");
    }

    #[test]
    fn test_emitters_accept_scored_candidate() {
        let candidate = Candidate::scored(
            "👍 text".to_string(),
            vec![JudgeVerdict::new("Coach", "good", serde_json::json!(8))],
        );
        emit_candidate_scored(0, &candidate);
        emit_winner_selected(0, candidate.aggregate_score, 1);
    }
}
