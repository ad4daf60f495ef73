//! Candidate generation: N independent draws from the same prompt.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::clients::{ChatMessage, Completion, CompletionRequest, TextModel};
use crate::domain::{InsightError, Result};
use crate::parallel::fan_out;

/// Draws candidate texts from a [`TextModel`].
#[derive(Clone)]
pub struct CandidateGenerator {
    model: Arc<dyn TextModel>,
    temperature: f32,
}

impl CandidateGenerator {
    pub fn new(model: Arc<dyn TextModel>, temperature: f32) -> Self {
        Self { model, temperature }
    }

    /// Issue `count` concurrent completions of `messages`.
    ///
    /// Results are in request order. Any failed call fails the whole batch.
    #[instrument(skip(self, messages), fields(temperature = self.temperature))]
    pub async fn generate(&self, messages: Vec<ChatMessage>, count: usize) -> Result<Vec<String>> {
        if count == 0 {
            return Err(InsightError::Config(
                "candidate count must be at least 1".to_string(),
            ));
        }

        let request = CompletionRequest::new(messages).with_temperature(self.temperature);
        let model = Arc::clone(&self.model);

        fan_out(vec![request; count], move |index, request| {
            let model = Arc::clone(&model);
            async move { draw(model.as_ref(), index, request).await }
        })
        .await
    }
}

async fn draw(model: &dyn TextModel, index: usize, request: CompletionRequest) -> Result<String> {
    match model.complete(request).await {
        Ok(Completion::Text(text)) => {
            debug!(index, chars = text.len(), "candidate drawn");
            Ok(text)
        }
        Ok(Completion::ToolCall { name, .. }) => Err(InsightError::UnexpectedReply {
            stage: "generate",
            detail: format!("candidate {index} came back as a call to {name}"),
        }),
        Err(source) => Err(InsightError::Generation { index, source }),
    }
}
