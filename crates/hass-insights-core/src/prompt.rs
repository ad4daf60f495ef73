//! Fixed prompt templates for the two report types.
//!
//! Each template carries a framing system message, embeds its input data as
//! verbatim JSON inside tagged sections, and pins the output format to a few
//! short emoji-prefixed lines.

use chrono_tz::Tz;

use crate::clients::ChatMessage;
use crate::domain::{DailyAggregate, EventAggregate, Result, WeatherObservation};

/// Input for one generation prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightPrompt {
    /// Active thermostat events, optionally with weather context.
    Hvac {
        events: Vec<EventAggregate>,
        weather: Vec<WeatherObservation>,
    },
    /// Daily hours spent at work and at home.
    WorkHome {
        work: Vec<DailyAggregate>,
        home: Vec<DailyAggregate>,
    },
}

impl InsightPrompt {
    /// Render the system and user messages for this prompt.
    pub fn messages(&self, tz: Tz) -> Result<Vec<ChatMessage>> {
        match self {
            InsightPrompt::Hvac { events, weather } => Ok(vec![
                ChatMessage::system(
                    "Analyze active HVAC events for the thermostat and provide actionable items.",
                ),
                ChatMessage::user(hvac_prompt(
                    &serde_json::to_string(events)?,
                    &serde_json::to_string(weather)?,
                    tz,
                )),
            ]),
            InsightPrompt::WorkHome { work, home } => Ok(vec![
                ChatMessage::system("Analyze work and home data and provide insights."),
                ChatMessage::user(work_home_prompt(
                    &serde_json::to_string(work)?,
                    &serde_json::to_string(home)?,
                    tz,
                )),
            ]),
        }
    }

    /// Whether there is anything to analyze.
    pub fn is_empty(&self) -> bool {
        match self {
            InsightPrompt::Hvac { events, .. } => events.is_empty(),
            InsightPrompt::WorkHome { work, home } => work.is_empty() && home.is_empty(),
        }
    }
}

fn hvac_prompt(events: &str, weather: &str, tz: Tz) -> String {
    format!(
        r#"You are analyzing active HVAC events for a smart thermostat and producing actionable items that reduce HVAC usage and lower energy bills. All timestamps are local {tz} times, written with their UTC offset.

1. Review the HVAC event data and the weather data:
<hvac_data>
{events}
</hvac_data>

<weather_data>
{weather}
</weather_data>

2. Look for patterns, inefficiencies and opportunities for energy savings, taking the weather conditions into account: temperature settings and their timing, duration and frequency of HVAC events, and their likely impact on consumption.

3. Write 3 to 5 summaries. Each summary must:
  - begin with an appropriate emoji
  - be under 100 words
  - cover exactly one specific, practical action (for example a schedule change, a thermostat programming change, or a complementary measure such as curtains or fans)

4. Output only the summaries, one per line, in this format:
[Emoji] [Summary under 100 words]

Base every recommendation on the data above. Do not add personal opinions or information not derived from the data."#
    )
}

fn work_home_prompt(work: &str, home: &str, tz: Tz) -> String {
    format!(
        r#"You are analyzing how much time was spent at work and at home over the past few days. Each entry gives a date, its weekday and the number of hours. All dates are in the {tz} time zone.

Work data:
<work_data>
{work}
</work_data>

Home data:
<home_data>
{home}
</home_data>

Write exactly three insights:
1. Something good that should continue
2. A fun fact about the data
3. Something that could be improved

Look for patterns and trends, the balance between work and home time, notable achievements, and how the numbers relate to well-being and productivity.

Each insight must be under 100 words, cover a single topic, and sit on its own line, in this order:
👍 [Good thing to continue]
🎉 [Fun fact]
🔧 [Thing to improve]

Keep every insight directly tied to the data above."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn la() -> Tz {
        "America/Los_Angeles".parse().unwrap()
    }

    fn day(d: u32, value: f64) -> DailyAggregate {
        let date = NaiveDate::from_ymd_opt(2024, 5, d).unwrap();
        DailyAggregate {
            date,
            label: date.format("%A").to_string(),
            value,
        }
    }

    #[test]
    fn test_work_home_prompt_embeds_data_verbatim() {
        let prompt = InsightPrompt::WorkHome {
            work: vec![day(1, 8.5)],
            home: vec![day(1, 14.25)],
        };
        let messages = prompt.messages(la()).unwrap();
        assert_eq!(messages.len(), 2);

        let user = &messages[1].content;
        let work_json = serde_json::to_string(&vec![day(1, 8.5)]).unwrap();
        assert!(user.contains(&format!("<work_data>\n{work_json}\n</work_data>")));
        assert!(user.contains("\"value\":14.25"));
        assert!(user.contains("America/Los_Angeles"));
        assert!(user.contains("👍"));
        assert!(user.contains("🔧"));
    }

    #[test]
    fn test_hvac_prompt_has_format_constraints() {
        let prompt = InsightPrompt::Hvac {
            events: vec![],
            weather: vec![],
        };
        let messages = prompt.messages(la()).unwrap();
        assert!(messages[0].content.contains("HVAC"));
        assert!(messages[1].content.contains("3 to 5 summaries"));
        assert!(messages[1].content.contains("<weather_data>\n[]\n</weather_data>"));
    }

    #[test]
    fn test_hvac_prompt_embeds_local_timestamps() {
        use crate::aggregate::{aggregate_events, EventFilter};
        use crate::domain::HistoryRecord;
        use chrono::{TimeZone, Utc};

        let record = HistoryRecord::new("climate.upstairs_2", "heat")
            .with_attribute("hvac_action", serde_json::json!("heating"))
            .at(Utc.with_ymd_and_hms(2024, 5, 2, 10, 0, 0).unwrap());
        let prompt = InsightPrompt::Hvac {
            events: aggregate_events(&[vec![record]], &EventFilter::hvac(), la()),
            weather: vec![],
        };
        let user = &prompt.messages(la()).unwrap()[1].content;
        assert!(user.contains("America/Los_Angeles"));
        assert!(user.contains("2024-05-02T03:00:00-07:00"));
        assert!(!user.contains("2024-05-02T10:00:00Z"));
    }

    #[test]
    fn test_is_empty() {
        let empty = InsightPrompt::Hvac {
            events: vec![],
            weather: vec![WeatherObservation::default()],
        };
        assert!(empty.is_empty());

        let work_only = InsightPrompt::WorkHome {
            work: vec![day(2, 1.0)],
            home: vec![],
        };
        assert!(!work_only.is_empty());
    }
}
