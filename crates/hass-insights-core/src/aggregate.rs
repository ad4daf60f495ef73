//! History aggregation.
//!
//! Turns the hub's nested per-entity history into compact summaries that fit
//! comfortably in a prompt:
//! - [`aggregate_daily`]: per local calendar day maximum of a numeric sensor
//! - [`aggregate_events`]: status-filtered events with trimmed attributes
//! - [`aggregate_weather`]: weather attribute projection

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{DailyAggregate, EventAggregate, HistoryRecord, WeatherObservation};

/// Attributes kept on HVAC events by [`EventFilter::hvac`].
pub const HVAC_ATTRIBUTES: &[&str] = &[
    "hvac_action",
    "hvac_mode",
    "current_temperature",
    "temperature",
    "target_temp_high",
    "target_temp_low",
    "fan_mode",
    "preset_mode",
    "current_humidity",
];

/// Which records [`aggregate_events`] drops and which attributes it keeps.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFilter {
    /// Attribute holding the status compared against `exclude_states`.
    pub status_field: String,
    pub exclude_states: HashSet<String>,
    /// Attributes to keep; empty keeps all of them.
    pub keep_attributes: Vec<String>,
}

impl EventFilter {
    pub fn new(status_field: &str, exclude_states: &[&str]) -> Self {
        Self {
            status_field: status_field.to_string(),
            exclude_states: exclude_states.iter().map(|s| s.to_string()).collect(),
            keep_attributes: Vec::new(),
        }
    }

    pub fn keep_attributes(mut self, keys: &[&str]) -> Self {
        self.keep_attributes = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// Active thermostat events: drops `hvac_action == "idle"`.
    pub fn hvac() -> Self {
        Self::new("hvac_action", &["idle"]).keep_attributes(HVAC_ATTRIBUTES)
    }

    fn excludes(&self, record: &HistoryRecord) -> bool {
        record
            .attribute_str(&self.status_field)
            .is_some_and(|status| self.exclude_states.contains(status))
    }
}

/// Flatten the hub's one-sequence-per-entity history.
pub fn flatten(history: &[Vec<HistoryRecord>]) -> impl Iterator<Item = &HistoryRecord> {
    history.iter().flatten()
}

/// Maximum numeric state per local calendar day, in date order.
///
/// Days whose records are all non-numeric (or lack a timestamp) are omitted.
pub fn aggregate_daily(history: &[Vec<HistoryRecord>], tz: Tz) -> Vec<DailyAggregate> {
    let mut maxima: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in flatten(history) {
        let Some(at) = record.timestamp() else {
            debug!(entity_id = %record.entity_id, "skipping record without timestamp");
            continue;
        };
        let Some(value) = record.numeric_state() else {
            debug!(entity_id = %record.entity_id, state = %record.state, "skipping non-numeric state");
            continue;
        };

        let day = at.with_timezone(&tz).date_naive();
        maxima
            .entry(day)
            .and_modify(|max| *max = max.max(value))
            .or_insert(value);
    }

    maxima
        .into_iter()
        .map(|(date, value)| DailyAggregate {
            date,
            label: date.format("%A").to_string(),
            value: round2(value),
        })
        .collect()
}

/// Order-preserving filter that drops records whose status is excluded.
/// Timestamps are expressed in `tz`.
pub fn aggregate_events(
    history: &[Vec<HistoryRecord>],
    filter: &EventFilter,
    tz: Tz,
) -> Vec<EventAggregate> {
    flatten(history)
        .filter(|record| !filter.excludes(record))
        .map(|record| EventAggregate {
            entity_id: record.entity_id.clone(),
            state: record.state.clone(),
            timestamp: record.local_timestamp(tz),
            attributes: if filter.keep_attributes.is_empty() {
                record.attributes.clone()
            } else {
                record
                    .attributes
                    .iter()
                    .filter(|(key, _)| filter.keep_attributes.iter().any(|k| k == *key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            },
        })
        .collect()
}

/// Project every weather record onto its numeric conditions.
pub fn aggregate_weather(history: &[Vec<HistoryRecord>], tz: Tz) -> Vec<WeatherObservation> {
    flatten(history)
        .map(|record| WeatherObservation::observed(record, tz))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
