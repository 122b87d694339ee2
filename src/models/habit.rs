use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub frequency: Frequency,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How often a habit is meant to be done.
///
/// Stored and serialized as a lowercase string: `daily`, `weekly`, or a full
/// weekday name such as `monday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    SpecificWeekday(Weekday),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrequencyError {
    #[error("unknown habit frequency '{0}': expected daily, weekly or a weekday name")]
    Unknown(String),
}

impl Default for Frequency {
    fn default() -> Self {
        Self::Daily
    }
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::SpecificWeekday(day) => match day {
                Weekday::Mon => "monday",
                Weekday::Tue => "tuesday",
                Weekday::Wed => "wednesday",
                Weekday::Thu => "thursday",
                Weekday::Fri => "friday",
                Weekday::Sat => "saturday",
                Weekday::Sun => "sunday",
            },
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = FrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let frequency = match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monday" => Frequency::SpecificWeekday(Weekday::Mon),
            "tuesday" => Frequency::SpecificWeekday(Weekday::Tue),
            "wednesday" => Frequency::SpecificWeekday(Weekday::Wed),
            "thursday" => Frequency::SpecificWeekday(Weekday::Thu),
            "friday" => Frequency::SpecificWeekday(Weekday::Fri),
            "saturday" => Frequency::SpecificWeekday(Weekday::Sat),
            "sunday" => Frequency::SpecificWeekday(Weekday::Sun),
            _ => return Err(FrequencyError::Unknown(s.to_string())),
        };
        Ok(frequency)
    }
}

impl TryFrom<String> for Frequency {
    type Error = FrequencyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,

    /// Default: daily
    #[serde(default)]
    pub frequency: Frequency,
}

/// Partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateHabitRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be under 2000 characters"))]
    pub description: Option<String>,

    pub frequency: Option<Frequency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parses_every_variant() {
        assert_eq!("daily".parse::<Frequency>(), Ok(Frequency::Daily));
        assert_eq!("Weekly".parse::<Frequency>(), Ok(Frequency::Weekly));
        assert_eq!(
            " monday ".parse::<Frequency>(),
            Ok(Frequency::SpecificWeekday(Weekday::Mon))
        );
        assert_eq!(
            "SUNDAY".parse::<Frequency>(),
            Ok(Frequency::SpecificWeekday(Weekday::Sun))
        );
    }

    #[test]
    fn test_unknown_frequency_is_rejected() {
        assert_eq!(
            "fortnightly".parse::<Frequency>(),
            Err(FrequencyError::Unknown("fortnightly".into()))
        );
        assert!("mon".parse::<Frequency>().is_err());
        assert!("".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_frequency_string_form_is_stable() {
        let all = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        for day in all {
            let frequency = Frequency::SpecificWeekday(day);
            assert_eq!(frequency.as_str().parse::<Frequency>(), Ok(frequency));
        }
        assert_eq!(Frequency::Daily.to_string(), "daily");
    }

    #[test]
    fn test_frequency_json_representation() {
        let json = serde_json::to_string(&Frequency::SpecificWeekday(Weekday::Fri)).unwrap();
        assert_eq!(json, "\"friday\"");

        let parsed: Frequency = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(parsed, Frequency::Weekly);

        assert!(serde_json::from_str::<Frequency>("\"hourly\"").is_err());
    }

    #[test]
    fn test_create_request_defaults_to_daily() {
        let body: CreateHabitRequest = serde_json::from_str(r#"{"name":"Read"}"#).unwrap();
        assert_eq!(body.frequency, Frequency::Daily);
        assert!(body.validate().is_ok());

        let empty: CreateHabitRequest = serde_json::from_str(r#"{"name":""}"#).unwrap();
        assert!(empty.validate().is_err());
    }
}
