//! Sensor history records and the compact summaries derived from them.

use chrono::{
    DateTime, Days, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One raw observation as returned by the hub's history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    #[serde(default)]
    pub entity_id: String,

    /// Raw state string; numeric sensors encode their value here.
    pub state: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,

    #[serde(default)]
    pub last_changed: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl HistoryRecord {
    pub fn new(entity_id: &str, state: &str) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            state: state.to_string(),
            attributes: Map::new(),
            last_changed: None,
            last_updated: None,
        }
    }

    /// Set `last_changed` (and `last_updated`) to `at`.
    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.last_changed = Some(at);
        self.last_updated = Some(at);
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// When the observation happened: `last_changed`, else `last_updated`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_changed.or(self.last_updated)
    }

    /// The state parsed as a finite number, if it is one.
    pub fn numeric_state(&self) -> Option<f64> {
        self.state
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// [`timestamp`](Self::timestamp) expressed in `tz`, keeping the local offset.
    pub fn local_timestamp(&self, tz: Tz) -> Option<DateTime<FixedOffset>> {
        self.timestamp().map(|at| at.with_timezone(&tz).fixed_offset())
    }

    /// A string attribute, if present.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(Value::as_str)
    }

    fn attribute_f64(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).and_then(Value::as_f64)
    }
}

/// History as the hub returns it: one sub-sequence per entity.
pub type EntityHistory = Vec<Vec<HistoryRecord>>;

/// Per-day summary of a numeric sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Weekday name, e.g. `Wednesday`.
    pub label: String,
    /// Maximum value seen that day, rounded to two decimals.
    pub value: f64,
}

/// A record that survived event filtering, trimmed to the attributes worth
/// sending to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventAggregate {
    pub entity_id: String,
    pub state: String,
    /// Local time of the event, serialized with its UTC offset.
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub attributes: Map<String, Value>,
}

/// Weather conditions at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherObservation {
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub cloud_coverage: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_bearing: Option<f64>,
    pub wind_speed: Option<f64>,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

impl WeatherObservation {
    /// Project `record` onto its weather attributes, stamped in local time.
    pub fn observed(record: &HistoryRecord, tz: Tz) -> Self {
        Self {
            temperature: record.attribute_f64("temperature"),
            dew_point: record.attribute_f64("dew_point"),
            humidity: record.attribute_f64("humidity"),
            cloud_coverage: record.attribute_f64("cloud_coverage"),
            pressure: record.attribute_f64("pressure"),
            wind_bearing: record.attribute_f64("wind_bearing"),
            wind_speed: record.attribute_f64("wind_speed"),
            last_updated: record
                .last_updated
                .map(|at| at.with_timezone(&tz).fixed_offset()),
        }
    }
}

/// Time range requested from the history endpoint, in local time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl HistoryWindow {
    /// Window from local midnight `days` days before `now` up to the last
    /// millisecond of the current local day.
    pub fn ending_today(now: DateTime<Utc>, tz: Tz, days: u32) -> Self {
        let today = now.with_timezone(&tz).date_naive();
        let first_day = today - Days::new(u64::from(days));
        let tomorrow = today + Days::new(1);

        Self {
            start: local_midnight(tz, first_day),
            end: local_midnight(tz, tomorrow) - Duration::milliseconds(1),
        }
    }
}

/// First instant of `date` in `tz`.
pub(crate) fn local_midnight(tz: Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        // Inside a DST gap: the first valid instant is one hour later.
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}
