use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Completion {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub completed_date: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateCompletionRequest {
    /// Default: now
    pub completed_date: Option<DateTime<Utc>>,

    #[validate(length(max = 500, message = "Note must be under 500 characters"))]
    pub note: Option<String>,
}

/// Inclusive day range filter for listing completions
#[derive(Debug, Deserialize)]
pub struct CompletionQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl CompletionQuery {
    pub fn validate_range(&self) -> Result<(), String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(format!("start ({start}) must not be after end ({end})"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validation() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        let open = CompletionQuery { start: None, end: None };
        assert!(open.validate_range().is_ok());

        let ordered = CompletionQuery { start: Some(day(1)), end: Some(day(1)) };
        assert!(ordered.validate_range().is_ok());

        let reversed = CompletionQuery { start: Some(day(5)), end: Some(day(1)) };
        assert!(reversed.validate_range().is_err());
    }

    #[test]
    fn test_note_length_is_bounded() {
        let body = CreateCompletionRequest {
            completed_date: None,
            note: Some("x".repeat(501)),
        };
        assert!(body.validate().is_err());
        assert!(CreateCompletionRequest::default().validate().is_ok());
    }
}
