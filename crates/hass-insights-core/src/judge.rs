//! Judge panel: one forced-structured model call per persona.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::clients::{ChatMessage, Completion, CompletionRequest, TextModel, ToolSpec};
use crate::domain::{InsightError, JudgePersona, JudgeVerdict, Result};
use crate::parallel::fan_out;

/// Name of the function judges must answer through.
pub const EVALUATION_TOOL: &str = "provide_evaluation_and_score";

const JUDGE_SYSTEM_PROMPT: &str = "You are an AI assistant that evaluates insights and provides scores.";

/// Tool definition forcing the `{ evaluation, score }` reply shape.
pub fn evaluation_tool() -> ToolSpec {
    ToolSpec {
        name: EVALUATION_TOOL.to_string(),
        description: "Provide an evaluation and score for the given insight".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "evaluation": {
                    "type": "string",
                    "description": "A detailed evaluation of the insight (1-2 sentences)"
                },
                "score": {
                    "type": "number",
                    "description": "A numerical score between 0 and 10"
                }
            },
            "required": ["evaluation", "score"]
        }),
    }
}

/// Reply shape a judge must produce. `score` stays raw; it is validated
/// during aggregation, not here.
#[derive(Debug, Deserialize)]
struct JudgeReply {
    evaluation: String,
    #[serde(default)]
    score: Value,
}

/// Scores candidate texts with a roster of personas.
#[derive(Clone)]
pub struct JudgePanel {
    model: Arc<dyn TextModel>,
}

impl JudgePanel {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Ask every persona for a verdict on `candidate`, concurrently.
    ///
    /// Verdicts come back in persona order. A failed call or a reply that does
    /// not match the required structure fails the whole panel.
    #[instrument(skip_all, fields(judges = personas.len()))]
    pub async fn evaluate(&self, candidate: &str, personas: &[JudgePersona]) -> Result<Vec<JudgeVerdict>> {
        let model = Arc::clone(&self.model);
        let candidate: Arc<str> = Arc::from(candidate);

        fan_out(personas.to_vec(), move |_, persona| {
            let model = Arc::clone(&model);
            let candidate = Arc::clone(&candidate);
            async move { judge(model.as_ref(), persona, &candidate).await }
        })
        .await
    }
}

async fn judge(model: &dyn TextModel, persona: JudgePersona, candidate: &str) -> Result<JudgeVerdict> {
    let request = CompletionRequest::new(vec![
        ChatMessage::system(JUDGE_SYSTEM_PROMPT),
        ChatMessage::user(judge_prompt(&persona, candidate)),
    ])
    .with_tool(evaluation_tool());

    let completion = model
        .complete(request)
        .await
        .map_err(|source| InsightError::Evaluation {
            judge: persona.name.to_string(),
            source,
        })?;

    let verdict = parse_verdict(persona.name, completion)?;
    debug!(judge = persona.name, score = %verdict.raw_score, "verdict received");
    Ok(verdict)
}

/// Validate a judge reply into a [`JudgeVerdict`].
pub fn parse_verdict(judge_name: &str, completion: Completion) -> Result<JudgeVerdict> {
    let malformed = |reason: String| InsightError::MalformedVerdict {
        judge: judge_name.to_string(),
        reason,
    };

    let arguments = match completion {
        Completion::ToolCall { name, arguments } if name == EVALUATION_TOOL => arguments,
        Completion::ToolCall { name, .. } => {
            return Err(malformed(format!("called unexpected tool {name}")));
        }
        Completion::Text(_) => return Err(malformed("replied with free text".to_string())),
    };

    let reply: JudgeReply =
        serde_json::from_str(&arguments).map_err(|e| malformed(e.to_string()))?;

    Ok(JudgeVerdict {
        judge_name: judge_name.to_string(),
        evaluation: reply.evaluation,
        raw_score: reply.score,
    })
}

fn judge_prompt(persona: &JudgePersona, candidate: &str) -> String {
    format!(
        r#"You are a specialized assistant with expertise in a particular field. Your role and focus are:
<name>{name}</name>

<description>{description}</description>

<focus>{focus}</focus>

Evaluate the following insight:

<insight>{candidate}</insight>

Judge it from your area of expertise and the focus above, considering its relevance, practicality and potential impact. Give a score from 0 to 10, where 0 is the lowest quality and 10 the highest, and a 1-2 sentence evaluation that agrees with the score.

Reply through the {tool} function with two fields:
1. "evaluation": your evaluation of the insight (1-2 sentences).
2. "score": your numerical score (0-10)."#,
        name = persona.name,
        description = persona.description,
        focus = persona.focus,
        tool = EVALUATION_TOOL,
    )
}
