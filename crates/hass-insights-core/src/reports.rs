//! The two report types and the run that ties fetch, pipeline and publish
//! together.
//!
//! - HVAC insight: one candidate per thermostat zone, no judging, every
//!   zone with activity gets its own message
//! - Work/home insight: best-of-N with the work-life judge panel, the
//!   winner is the only message

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::Instrument;
use uuid::Uuid;

use crate::aggregate::{aggregate_daily, aggregate_events, aggregate_weather, EventFilter};
use crate::clients::HistoryClient;
use crate::domain::{EntityHistory, HistoryWindow, InsightError, Result, SelectionResult};
use crate::metrics::RunMetrics;
use crate::obs::{
    emit_history_fetched, emit_report_skipped, emit_run_failed, emit_run_finished,
    emit_run_started, run_span,
};
use crate::personas::WORK_LIFE_PANEL;
use crate::pipeline::InsightPipeline;
use crate::prompt::InsightPrompt;
use crate::reporter::Reporter;

pub const WORK_HOME_TITLE: &str = "Time at work vs home";

/// A thermostat zone: climate entity plus the label used in the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub entity_id: String,
    pub label: String,
}

impl Zone {
    pub fn new(entity_id: &str, label: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            label: label.to_string(),
        }
    }

    pub fn title(&self) -> String {
        format!("Nest report for {}", self.label)
    }
}

impl FromStr for Zone {
    type Err = InsightError;

    /// `climate.upstairs=upstairs`, or a bare entity id labelled by its object id.
    fn from_str(s: &str) -> Result<Self> {
        let (entity_id, label) = match s.split_once('=') {
            Some((entity_id, label)) => (entity_id.trim(), label.trim()),
            None => {
                let entity_id = s.trim();
                let object_id = entity_id.split_once('.').map_or(entity_id, |(_, id)| id);
                (entity_id, object_id)
            }
        };
        if entity_id.is_empty() || label.is_empty() {
            return Err(InsightError::Config(format!("invalid zone: {s:?}")));
        }
        Ok(Zone::new(entity_id, label))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HvacReport {
    pub zones: Vec<Zone>,
    pub days: u32,
    pub weather_entity: Option<String>,
}

impl Default for HvacReport {
    fn default() -> Self {
        Self {
            zones: vec![
                Zone::new("climate.upstairs_2", "upstairs"),
                Zone::new("climate.downstairs", "downstairs"),
            ],
            days: 7,
            weather_entity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkHomeReport {
    pub work_entity: String,
    pub home_entity: String,
    pub days: u32,
}

impl Default for WorkHomeReport {
    fn default() -> Self {
        Self {
            work_entity: "sensor.time_at_work".to_string(),
            home_entity: "sensor.time_at_home".to_string(),
            days: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportKind {
    Hvac(HvacReport),
    WorkHome(WorkHomeReport),
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Hvac(_) => write!(f, "hvac"),
            ReportKind::WorkHome(_) => write!(f, "work-home"),
        }
    }
}

/// What a run published.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub run_id: String,
    /// Titles of the messages posted, in order.
    pub published: Vec<String>,
    /// Best-of-N bookkeeping, for the work/home report.
    pub selection: Option<SelectionResult>,
    pub metrics: RunMetrics,
}

/// Executes reports against the configured collaborators.
pub struct ReportRunner {
    history: Arc<dyn HistoryClient>,
    pipeline: InsightPipeline,
    reporter: Reporter,
}

impl ReportRunner {
    pub fn new(history: Arc<dyn HistoryClient>, pipeline: InsightPipeline, reporter: Reporter) -> Self {
        Self {
            history,
            pipeline,
            reporter,
        }
    }

    /// Run one report end to end. Any failure aborts the run; nothing is
    /// published after a failed stage.
    pub async fn run(&self, kind: &ReportKind, now: DateTime<Utc>) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let report = kind.to_string();
        let started = Instant::now();

        async {
            emit_run_started(&run_id, &report);
            let mut outcome = match kind {
                ReportKind::Hvac(hvac) => self.run_hvac(hvac, now).await,
                ReportKind::WorkHome(work_home) => self.run_work_home(work_home, now).await,
            }
            .inspect_err(|e| emit_run_failed(&run_id, e.stage(), e))?;

            outcome.run_id = run_id.clone();
            emit_run_finished(
                &run_id,
                started.elapsed().as_millis() as u64,
                outcome.published.len(),
            );
            outcome.metrics.flush(&run_id);
            Ok::<_, InsightError>(outcome)
        }
        .instrument(run_span(&run_id, &report))
        .await
    }

    async fn run_hvac(&self, hvac: &HvacReport, now: DateTime<Utc>) -> Result<RunOutcome> {
        let window = self.window(now, hvac.days);
        let tz = self.pipeline.config().timezone;
        let weather = match &hvac.weather_entity {
            Some(entity_id) => aggregate_weather(&self.fetch(entity_id, &window).await?, tz),
            None => Vec::new(),
        };

        // Every zone is drafted before anything is posted.
        let mut outcome = RunOutcome::default();
        let mut drafts = Vec::new();
        for zone in &hvac.zones {
            let history = self.fetch(&zone.entity_id, &window).await?;
            let events = aggregate_events(&history, &EventFilter::hvac(), tz);
            let title = zone.title();
            if events.is_empty() {
                emit_report_skipped(&title, "no active HVAC events");
                continue;
            }

            let prompt = InsightPrompt::Hvac {
                events,
                weather: weather.clone(),
            };
            drafts.push((title, self.pipeline.generate_one(&prompt).await?));
            outcome.metrics.record_draft();
        }

        for (title, insight) in drafts {
            self.reporter.publish(&title, &insight).await?;
            outcome.metrics.record_published();
            outcome.published.push(title);
        }
        Ok(outcome)
    }

    async fn run_work_home(&self, report: &WorkHomeReport, now: DateTime<Utc>) -> Result<RunOutcome> {
        let window = self.window(now, report.days);
        let tz = self.pipeline.config().timezone;

        let work = aggregate_daily(&self.fetch(&report.work_entity, &window).await?, tz);
        let home = aggregate_daily(&self.fetch(&report.home_entity, &window).await?, tz);

        let prompt = InsightPrompt::WorkHome { work, home };
        if prompt.is_empty() {
            emit_report_skipped(WORK_HOME_TITLE, "no numeric work or home readings");
            return Ok(RunOutcome::default());
        }

        let selection = self.pipeline.best_of(&prompt, &WORK_LIFE_PANEL).await?;
        let mut metrics = RunMetrics::default();
        metrics.record_selection(&selection);

        self.reporter
            .publish(WORK_HOME_TITLE, &selection.winner().text)
            .await?;
        metrics.record_published();

        Ok(RunOutcome {
            published: vec![WORK_HOME_TITLE.to_string()],
            selection: Some(selection),
            metrics,
            ..RunOutcome::default()
        })
    }

    fn window(&self, now: DateTime<Utc>, days: u32) -> HistoryWindow {
        HistoryWindow::ending_today(now, self.pipeline.config().timezone, days)
    }

    async fn fetch(&self, entity_id: &str, window: &HistoryWindow) -> Result<EntityHistory> {
        let history = self.history.fetch_history(entity_id, window).await?;
        emit_history_fetched(entity_id, history.iter().map(Vec::len).sum());
        Ok(history)
    }
}
