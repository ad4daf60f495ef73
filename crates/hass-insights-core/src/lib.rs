//! hass-insights core library
//!
//! Scheduled insight reports for a Home Assistant hub: sensor history is
//! aggregated into compact daily/event summaries, a language model drafts
//! candidate insights, a persona panel judges them, and the best one is
//! posted to a chat channel.
//!
//! Network collaborators are abstracted behind the traits in [`clients`];
//! `hass-insights-http` provides the real implementations and [`fakes`]
//! provides in-memory ones.

pub mod aggregate;
pub mod clients;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod generate;
pub mod judge;
pub mod metrics;
pub mod obs;
pub mod parallel;
pub mod personas;
pub mod pipeline;
pub mod prompt;
pub mod reporter;
pub mod reports;
pub mod scoring;
pub mod telemetry;

pub use aggregate::{aggregate_daily, aggregate_events, aggregate_weather, EventFilter};
pub use clients::{
    ChatMessage, Completion, CompletionRequest, HistoryClient, NotificationSink, Role,
    SlackMessage, TextModel, ToolSpec,
};
pub use config::InsightConfig;
pub use domain::{
    Candidate, DailyAggregate, EntityHistory, EventAggregate, HistoryRecord, HistoryWindow,
    InsightError, JudgePersona, JudgeVerdict, ModelError, Result, SelectionResult,
    WeatherObservation,
};
pub use generate::CandidateGenerator;
pub use judge::{evaluation_tool, JudgePanel, EVALUATION_TOOL};
pub use metrics::RunMetrics;
pub use parallel::fan_out;
pub use personas::WORK_LIFE_PANEL;
pub use pipeline::InsightPipeline;
pub use prompt::InsightPrompt;
pub use reporter::Reporter;
pub use reports::{HvacReport, ReportKind, ReportRunner, RunOutcome, WorkHomeReport, Zone};
pub use scoring::{aggregate_score, coerce_score, select_best, select_best_index};
pub use telemetry::init_tracing;

/// hass-insights version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
