//! hass-insights - scheduled Home Assistant insight reports
//!
//! Meant to be run from cron or a systemd timer. Settings come from flags,
//! environment variables, or a `.env` file in the working directory.
//!
//! ## Commands
//!
//! - `hvac`: one recommendation message per thermostat zone
//! - `work-home`: best-of-N work/home balance insight, judged by a persona panel

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use hass_insights_core::config::{
    DEFAULT_CANDIDATES, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEZONE,
};
use hass_insights_core::{
    init_tracing, HvacReport, InsightConfig, InsightError, InsightPipeline, ReportKind,
    ReportRunner, Reporter, WorkHomeReport, Zone,
};
use hass_insights_http::openai::DEFAULT_BASE_URL;
use hass_insights_http::{HomeAssistantClient, OpenAiClient, SlackWebhook};

#[derive(Parser, Debug)]
#[command(name = "hass-insights")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LLM-written insight reports from Home Assistant history, posted to Slack", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct Settings {
    /// Home Assistant base URL
    #[arg(long, env = "HOME_ASSISTANT_URL")]
    hass_url: String,

    /// Home Assistant long-lived access token
    #[arg(long, env = "HOME_ASSISTANT_TOKEN", hide_env_values = true)]
    hass_token: String,

    /// Slack incoming webhook URL
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    slack_webhook_url: String,

    /// API key for the chat completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Model used for generation and judging
    #[arg(long, env = "INSIGHTS_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// IANA timezone for day boundaries
    #[arg(long, env = "INSIGHTS_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Sampling temperature for candidate generation
    #[arg(long, env = "INSIGHTS_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Candidates drawn for best-of-N reports
    #[arg(long, env = "INSIGHTS_CANDIDATES", default_value_t = DEFAULT_CANDIDATES)]
    candidates: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Post HVAC recommendations for each thermostat zone
    Hvac {
        /// Zone as `entity_id=label` (repeatable; defaults to upstairs and downstairs)
        #[arg(long = "zone", value_name = "ENTITY=LABEL")]
        zones: Vec<Zone>,

        /// Days of history to analyze
        #[arg(long, default_value_t = 7)]
        days: u32,

        /// Weather entity providing outdoor conditions
        #[arg(long)]
        weather_entity: Option<String>,
    },

    /// Post the best-scoring work/home balance insight
    WorkHome {
        /// Sensor reporting hours at work
        #[arg(long, default_value = "sensor.time_at_work")]
        work_entity: String,

        /// Sensor reporting hours at home
        #[arg(long, default_value = "sensor.time_at_home")]
        home_entity: String,

        /// Days of history to analyze
        #[arg(long, default_value_t = 3)]
        days: u32,
    },
}

impl Commands {
    fn into_report(self) -> ReportKind {
        match self {
            Commands::Hvac {
                zones,
                days,
                weather_entity,
            } => {
                let defaults = HvacReport::default();
                ReportKind::Hvac(HvacReport {
                    zones: if zones.is_empty() { defaults.zones } else { zones },
                    days,
                    weather_entity,
                })
            }
            Commands::WorkHome {
                work_entity,
                home_entity,
                days,
            } => ReportKind::WorkHome(WorkHomeReport {
                work_entity,
                home_entity,
                days,
            }),
        }
    }
}

fn build_runner(settings: &Settings) -> Result<ReportRunner> {
    let config = InsightConfig::new(&settings.timezone, settings.temperature, settings.candidates)
        .context("Invalid insight configuration")?;

    let history = HomeAssistantClient::new(&settings.hass_url, &settings.hass_token)
        .context("Failed to create Home Assistant client")?;
    let model = OpenAiClient::new(
        &settings.openai_base_url,
        &settings.model,
        settings.openai_api_key.clone(),
    )
    .context("Failed to create model client")?;
    let sink =
        SlackWebhook::new(&settings.slack_webhook_url).context("Failed to create Slack client")?;

    Ok(ReportRunner::new(
        Arc::new(history),
        InsightPipeline::new(Arc::new(model), config),
        Reporter::new(Arc::new(sink)),
    ))
}

/// The one terminal diagnostic for a failed run: report kind, stage, cause.
fn failure(report: &ReportKind, error: InsightError) -> anyhow::Error {
    let stage = error.stage();
    anyhow::Error::new(error).context(format!("{report} report failed at the {stage} stage"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the process environment still applies.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let runner = build_runner(&cli.settings)?;
    let report = cli.command.into_report();

    let outcome = runner
        .run(&report, Utc::now())
        .await
        .map_err(|e| failure(&report, e))?;

    info!(
        report = %report,
        run_id = %outcome.run_id,
        published = outcome.published.len(),
        "done"
    );
    Ok(())
}
