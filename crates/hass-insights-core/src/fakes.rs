//! In-memory fakes for the collaborator traits (testing only)
//!
//! Provides `StaticHistory`, `ScriptedModel`, and `RecordingSink`, which
//! satisfy the trait contracts without any network access and record what
//! they were asked to do.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::clients::{Completion, CompletionRequest, HistoryClient, NotificationSink, SlackMessage, TextModel};
use crate::domain::{EntityHistory, HistoryWindow, InsightError, ModelError, Result};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// StaticHistory
// ---------------------------------------------------------------------------

/// History client serving canned per-entity history.
///
/// Unknown entities yield an empty history, like the hub does.
#[derive(Debug, Default)]
pub struct StaticHistory {
    entities: HashMap<String, EntityHistory>,
    failing: HashSet<String>,
    requests: Mutex<Vec<(String, HistoryWindow)>>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity_id: &str, history: EntityHistory) -> Self {
        self.entities.insert(entity_id.to_string(), history);
        self
    }

    /// Make fetches of `entity_id` fail.
    pub fn failing(mut self, entity_id: &str) -> Self {
        self.failing.insert(entity_id.to_string());
        self
    }

    /// Every `(entity_id, window)` requested so far.
    pub fn requests(&self) -> Vec<(String, HistoryWindow)> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl HistoryClient for StaticHistory {
    async fn fetch_history(&self, entity_id: &str, window: &HistoryWindow) -> Result<EntityHistory> {
        locked(&self.requests).push((entity_id.to_string(), window.clone()));

        if self.failing.contains(entity_id) {
            return Err(InsightError::Fetch {
                entity_id: entity_id.to_string(),
                reason: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        Ok(self.entities.get(entity_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// ScriptedModel
// ---------------------------------------------------------------------------

type JudgeScript = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Text model with scripted replies.
///
/// Plain requests are answered with the configured texts in rotation.
/// Requests that force a tool are judge calls: the judge script receives the
/// user prompt and returns the raw tool-call arguments.
pub struct ScriptedModel {
    texts: Vec<String>,
    judge: JudgeScript,
    fail_generation_after: Option<usize>,
    fail_evaluation: bool,
    generation_calls: AtomicUsize,
    evaluation_calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    /// Model replying with `texts` in rotation and a score of 7 from every judge.
    pub fn new(texts: Vec<&str>) -> Self {
        Self {
            texts: texts.into_iter().map(str::to_string).collect(),
            judge: Arc::new(|_| json!({"evaluation": "Solid.", "score": 7}).to_string()),
            fail_generation_after: None,
            fail_evaluation: false,
            generation_calls: AtomicUsize::new(0),
            evaluation_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Score every judged prompt with `score(prompt)`.
    pub fn with_scores<F>(self, score: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.with_judge_arguments(move |prompt| {
            json!({"evaluation": "Scored by script.", "score": score(prompt)}).to_string()
        })
    }

    /// Answer judge calls with arbitrary raw argument text.
    pub fn with_judge_arguments<F>(mut self, arguments: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.judge = Arc::new(arguments);
        self
    }

    /// Let the first `n` generation calls succeed and fail the rest.
    pub fn fail_generation_after(mut self, n: usize) -> Self {
        self.fail_generation_after = Some(n);
        self
    }

    /// Fail every judge call at the transport level.
    pub fn fail_evaluation(mut self) -> Self {
        self.fail_evaluation = true;
        self
    }

    pub fn generation_calls(&self) -> usize {
        self.generation_calls.load(Ordering::SeqCst)
    }

    pub fn evaluation_calls(&self) -> usize {
        self.evaluation_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        locked(&self.requests).clone()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<Completion, ModelError> {
        locked(&self.requests).push(request.clone());

        if let Some(tool) = &request.tool {
            self.evaluation_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_evaluation {
                return Err(ModelError::Status {
                    status: 500,
                    body: "judge unavailable".to_string(),
                });
            }
            return Ok(Completion::ToolCall {
                name: tool.name.clone(),
                arguments: (self.judge)(request.user_content()),
            });
        }

        let n = self.generation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_generation_after.is_some_and(|limit| n >= limit) {
            return Err(ModelError::Transport("connection reset".to_string()));
        }
        if self.texts.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(Completion::Text(self.texts[n % self.texts.len()].clone()))
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Notification sink that keeps every posted message.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reject: bool,
    messages: Mutex<Vec<SlackMessage>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects every message.
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<SlackMessage> {
        locked(&self.messages).clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn post_message(&self, message: &SlackMessage) -> Result<()> {
        if self.reject {
            return Err(InsightError::Publish("webhook returned HTTP 403".to_string()));
        }
        locked(&self.messages).push(message.clone());
        Ok(())
    }
}
