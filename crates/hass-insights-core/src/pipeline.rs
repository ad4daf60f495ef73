//! Generation-and-evaluation pipeline.
//!
//! `generate → evaluate (N candidates × M judges) → aggregate → select`.
//! The pipeline never publishes; callers hand the winner to a
//! [`Reporter`](crate::reporter::Reporter) once selection succeeded.

use std::sync::Arc;

use tracing::instrument;

use crate::clients::TextModel;
use crate::config::InsightConfig;
use crate::domain::{Candidate, InsightError, JudgePersona, Result, SelectionResult};
use crate::generate::CandidateGenerator;
use crate::judge::JudgePanel;
use crate::obs::{emit_candidate_scored, emit_candidates_generated, emit_winner_selected};
use crate::parallel::fan_out;
use crate::prompt::InsightPrompt;
use crate::scoring::select_best_index;

pub struct InsightPipeline {
    config: InsightConfig,
    generator: CandidateGenerator,
    panel: JudgePanel,
}

impl InsightPipeline {
    pub fn new(model: Arc<dyn TextModel>, config: InsightConfig) -> Self {
        Self {
            generator: CandidateGenerator::new(Arc::clone(&model), config.temperature),
            panel: JudgePanel::new(model),
            config,
        }
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Single-candidate flow: one draw, no judging.
    #[instrument(skip_all)]
    pub async fn generate_one(&self, prompt: &InsightPrompt) -> Result<String> {
        let messages = prompt.messages(self.config.timezone)?;
        let mut texts = self.generator.generate(messages, 1).await?;
        emit_candidates_generated(texts.len());
        texts.pop().ok_or_else(|| InsightError::UnexpectedReply {
            stage: "generate",
            detail: "no candidate returned".to_string(),
        })
    }

    /// Best-of-N flow: draw `candidate_count` candidates, score each with
    /// every persona, and pick the highest average (earliest wins ties).
    #[instrument(skip_all, fields(candidates = self.config.candidate_count, judges = personas.len()))]
    pub async fn best_of(&self, prompt: &InsightPrompt, personas: &[JudgePersona]) -> Result<SelectionResult> {
        let messages = prompt.messages(self.config.timezone)?;
        let texts = self
            .generator
            .generate(messages, self.config.candidate_count)
            .await?;
        emit_candidates_generated(texts.len());

        let candidates = self.evaluate_all(texts, personas).await?;
        for (index, candidate) in candidates.iter().enumerate() {
            emit_candidate_scored(index, candidate);
        }

        let winner_index = select_best_index(&candidates)?;
        emit_winner_selected(
            winner_index,
            candidates[winner_index].aggregate_score,
            candidates.len(),
        );

        Ok(SelectionResult {
            winner_index,
            candidates,
        })
    }

    /// Run one panel per candidate, all concurrently, in candidate order.
    async fn evaluate_all(&self, texts: Vec<String>, personas: &[JudgePersona]) -> Result<Vec<Candidate>> {
        let personas: Arc<[JudgePersona]> = Arc::from(personas);
        let panel = self.panel.clone();

        fan_out(texts, move |_, text| {
            let panel = panel.clone();
            let personas = Arc::clone(&personas);
            async move {
                let verdicts = panel.evaluate(&text, &personas).await?;
                if verdicts.len() != personas.len() {
                    return Err(InsightError::IncompletePanel {
                        expected: personas.len(),
                        actual: verdicts.len(),
                    });
                }
                Ok(Candidate::scored(text, verdicts))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::ScriptedModel;
    use crate::personas::WORK_LIFE_PANEL;
    use serde_json::json;

    fn prompt() -> InsightPrompt {
        InsightPrompt::WorkHome {
            work: vec![],
            home: vec![],
        }
    }

    fn config(candidate_count: usize) -> InsightConfig {
        InsightConfig {
            candidate_count,
            ..InsightConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_one_skips_judging() {
        let model = Arc::new(ScriptedModel::new(vec!["🌡️ Lower the setpoint"]));
        let pipeline = InsightPipeline::new(model.clone(), config(4));

        let text = pipeline.generate_one(&prompt()).await.unwrap();

        assert_eq!(text, "🌡️ Lower the setpoint");
        assert_eq!(model.generation_calls(), 1);
        assert_eq!(model.evaluation_calls(), 0);
    }

    #[tokio::test]
    async fn test_best_of_picks_highest_average() {
        let model = Arc::new(
            ScriptedModel::new(vec!["alpha", "bravo", "charlie"]).with_scores(|prompt| {
                if prompt.contains("<insight>bravo</insight>") {
                    json!(9)
                } else {
                    json!(5)
                }
            }),
        );
        let pipeline = InsightPipeline::new(model.clone(), config(3));

        let result = pipeline.best_of(&prompt(), &WORK_LIFE_PANEL).await.unwrap();

        assert_eq!(result.candidates.len(), 3);
        assert_eq!(result.winner().text, "bravo");
        assert_eq!(result.winner().aggregate_score, 9.0);
        assert!(result.candidates.iter().all(|c| c.verdicts.len() == 7));
    }

    #[tokio::test]
    async fn test_best_of_with_empty_panel_scores_zero_and_keeps_first() {
        let model = Arc::new(ScriptedModel::new(vec!["one", "two"]));
        let pipeline = InsightPipeline::new(model.clone(), config(2));

        let result = pipeline.best_of(&prompt(), &[]).await.unwrap();

        assert_eq!(result.winner_index, 0);
        assert!(result.candidates.iter().all(|c| c.aggregate_score == 0.0));
        assert_eq!(model.evaluation_calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_verdict_aborts_selection() {
        let model = Arc::new(
            ScriptedModel::new(vec!["a", "b"]).with_judge_arguments(|_| "oops".to_string()),
        );
        let pipeline = InsightPipeline::new(model, config(2));
        let err = pipeline
            .best_of(&prompt(), &WORK_LIFE_PANEL)
            .await
            .unwrap_err();
        assert!(matches!(err, InsightError::MalformedVerdict { .. }));
    }
}
