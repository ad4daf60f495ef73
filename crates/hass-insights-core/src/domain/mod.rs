//! Domain models for hass-insights.
//!
//! - `HistoryRecord` and its derived summaries (`DailyAggregate`,
//!   `EventAggregate`, `WeatherObservation`)
//! - `JudgePersona` / `JudgeVerdict`: the judge panel's inputs and outputs
//! - `Candidate` / `SelectionResult`: best-of-N bookkeeping

pub mod candidate;
pub mod error;
pub mod history;
pub mod judge;

pub use candidate::{Candidate, SelectionResult};
pub use error::{InsightError, ModelError, Result};
pub use history::{
    DailyAggregate, EntityHistory, EventAggregate, HistoryRecord, HistoryWindow,
    WeatherObservation,
};
pub use judge::{JudgePersona, JudgeVerdict};
