//! OpenAI-compatible chat completions client.
//!
//! Works with any endpoint speaking the `/chat/completions` protocol. When a
//! request carries a tool, the model is forced to call it and the raw
//! argument text of the first tool call is returned unvalidated.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use hass_insights_core::{
    ChatMessage, Completion, CompletionRequest, InsightError, ModelError, Result, TextModel,
    ToolSpec,
};

use crate::USER_AGENT;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Chat completions backend bound to one model.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| InsightError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }

    /// Client for the hosted OpenAI API.
    pub fn openai(model: &str, api_key: impl Into<String>) -> Result<Self> {
        Self::new(DEFAULT_BASE_URL, model, Some(api_key.into()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

impl<'a> ChatRequest<'a> {
    fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        let (tools, tool_choice) = match &request.tool {
            Some(tool) => (Some(vec![tool_definition(tool)]), Some(forced_choice(tool))),
            None => (None, None),
        };
        Self {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            tools,
            tool_choice,
        }
    }
}

fn tool_definition(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

fn forced_choice(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": { "name": tool.name }
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallResponse>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallResponse {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

impl ChatResponse {
    fn into_completion(self) -> std::result::Result<Completion, ModelError> {
        let message = self
            .choices
            .into_iter()
            .next()
            .ok_or(ModelError::EmptyResponse)?
            .message;

        if let Some(call) = message.tool_calls.unwrap_or_default().into_iter().next() {
            return Ok(Completion::ToolCall {
                name: call.function.name,
                arguments: call.function.arguments,
            });
        }

        match message.content.map(|c| c.trim().to_string()) {
            Some(text) if !text.is_empty() => Ok(Completion::Text(text)),
            _ => Err(ModelError::EmptyResponse),
        }
    }
}

#[async_trait]
impl TextModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<Completion, ModelError> {
        let body = ChatRequest::new(&self.model, &request);
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tool = request.tool.as_ref().map(|t| t.name.as_str()),
            "chat completion"
        );

        let mut http_request = self.http.post(self.chat_completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| ModelError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ModelError::RateLimited);
            }
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?
            .into_completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hass_insights_core::evaluation_tool;

    fn response(value: Value) -> ChatResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_plain_request_omits_tools() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]).with_temperature(0.7);
        let body = serde_json::to_value(ChatRequest::new("gpt-4o-mini", &request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn test_tool_request_forces_the_tool() {
        let request =
            CompletionRequest::new(vec![ChatMessage::user("judge")]).with_tool(evaluation_tool());
        let body = serde_json::to_value(ChatRequest::new("m", &request)).unwrap();
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(
            body["tools"][0]["function"]["name"],
            "provide_evaluation_and_score"
        );
        assert_eq!(
            body["tool_choice"]["function"]["name"],
            "provide_evaluation_and_score"
        );
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_text_reply_is_trimmed() {
        let completion = response(json!({
            "choices": [{"message": {"content": "  👍 keep it up\n"}}]
        }))
        .into_completion()
        .unwrap();
        assert_eq!(completion, Completion::Text("👍 keep it up".to_string()));
    }

    #[test]
    fn test_tool_call_reply_returns_raw_arguments() {
        let completion = response(json!({
            "choices": [{"message": {
                "content": null,
                "tool_calls": [{"id": "call_1", "type": "function", "function": {
                    "name": "provide_evaluation_and_score",
                    "arguments": "{\"evaluation\":\"ok\",\"score\":\"8\"}"
                }}]
            }}]
        }))
        .into_completion()
        .unwrap();
        assert_eq!(
            completion,
            Completion::ToolCall {
                name: "provide_evaluation_and_score".to_string(),
                arguments: r#"{"evaluation":"ok","score":"8"}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_null_tool_calls_is_text_reply() {
        let completion = response(json!({
            "choices": [{"message": {"content": "hi", "tool_calls": null}}]
        }))
        .into_completion()
        .unwrap();
        assert_eq!(completion, Completion::Text("hi".to_string()));
    }

    #[test]
    fn test_no_choices_or_blank_content_is_empty_response() {
        let no_choices = response(json!({"choices": []})).into_completion();
        assert!(matches!(no_choices, Err(ModelError::EmptyResponse)));

        let blank = response(json!({"choices": [{"message": {"content": "   "}}]})).into_completion();
        assert!(matches!(blank, Err(ModelError::EmptyResponse)));
    }
}
