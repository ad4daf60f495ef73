//! Run configuration passed explicitly through the pipeline.

use chrono_tz::Tz;

use crate::domain::{InsightError, Result};

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_CANDIDATES: usize = 4;

/// Parameters shared by every stage of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    /// Zone used for day boundaries and history windows.
    pub timezone: Tz,
    /// Sampling temperature for candidate generation.
    pub temperature: f32,
    /// Candidates drawn in best-of-N runs.
    pub candidate_count: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::Los_Angeles,
            temperature: DEFAULT_TEMPERATURE,
            candidate_count: DEFAULT_CANDIDATES,
        }
    }
}

impl InsightConfig {
    /// Build and validate a configuration.
    pub fn new(timezone: &str, temperature: f32, candidate_count: usize) -> Result<Self> {
        let config = Self {
            timezone: parse_timezone(timezone)?,
            temperature,
            candidate_count,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.temperature.is_finite() || self.temperature <= 0.0 {
            return Err(InsightError::Config(format!(
                "temperature must be a positive number, got {}",
                self.temperature
            )));
        }
        if self.candidate_count == 0 {
            return Err(InsightError::Config(
                "candidate count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse an IANA timezone name such as `America/Los_Angeles`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| InsightError::Config(format!("unknown timezone: {name}")))
}
