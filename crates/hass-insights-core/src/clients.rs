//! Collaborator traits.
//!
//! The pipeline talks to the outside world through three narrow seams:
//! - `HistoryClient`: time-range history from the home-automation hub
//! - `TextModel`: chat-completion style generative model
//! - `NotificationSink`: chat channel the final report is posted to
//!
//! HTTP implementations live in `hass-insights-http`; in-memory fakes for
//! tests live in [`crate::fakes`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{EntityHistory, HistoryWindow, ModelError, Result};

/// Source of raw sensor history.
#[async_trait]
pub trait HistoryClient: Send + Sync {
    /// Fetch the history of `entity_id` within `window`, one sub-sequence per entity.
    async fn fetch_history(&self, entity_id: &str, window: &HistoryWindow) -> Result<EntityHistory>;
}

/// Generative text model.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Run one completion. When `request.tool` is set the model is forced to
    /// answer through that tool and the reply is a [`Completion::ToolCall`].
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<Completion, ModelError>;
}

/// Destination for finished reports.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn post_message(&self, message: &SlackMessage) -> Result<()>;
}

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A function the model must call to deliver a structured reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub tool: Option<ToolSpec>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Content of the last user message.
    pub fn user_content(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// What a model call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Free text, trimmed.
    Text(String),
    /// A forced function call; `arguments` is the raw, unvalidated JSON text.
    ToolCall { name: String, arguments: String },
}

/// Two-block chat message: header plus markdown body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub title: String,
    pub body: String,
}

impl SlackMessage {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
        }
    }
}
