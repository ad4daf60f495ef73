//! HTTP implementations of the hass-insights collaborator traits
//!
//! - [`HomeAssistantClient`]: `HistoryClient` over the hub's REST history API
//! - [`OpenAiClient`]: `TextModel` over an OpenAI-compatible chat completions API
//! - [`SlackWebhook`]: `NotificationSink` posting Block Kit messages to an incoming webhook

pub mod home_assistant;
pub mod openai;
pub mod slack;

pub use home_assistant::HomeAssistantClient;
pub use openai::OpenAiClient;
pub use slack::SlackWebhook;

/// User agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("hass-insights/", env!("CARGO_PKG_VERSION"));
