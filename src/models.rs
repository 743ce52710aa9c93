// Data models for the task list

use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};

/// Task identifier: the creation time in milliseconds, bumped on collision
pub type TaskId = i64;

/// Message attached to a task when it is completed
pub const COMPLETION_MESSAGE: &str = "Great job! Task completed!";

/// Canonical due date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single to-do item
///
/// Editing mode is not part of the record; the store tracks which task is
/// being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub due_date: Option<String>,
    pub completed: bool,
    pub completion_message: Option<String>,
}

impl Task {
    pub(crate) fn new(id: TaskId, text: String, due_date: Option<String>) -> Self {
        Self {
            id,
            text,
            due_date,
            completed: false,
            completion_message: None,
        }
    }

    /// Due date parsed back into a calendar date, if present and canonical
    pub fn due(&self) -> Option<NaiveDate> {
        self.due_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
    }

    /// Mark completed; returns false if it already was
    pub(crate) fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completion_message = Some(COMPLETION_MESSAGE.to_string());
        true
    }
}

/// Text and date to pre-populate the entry fields when editing starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub due: Option<NaiveDate>,
}

/// Trim task text, rejecting it when nothing is left
pub fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// Render an optional date in canonical `YYYY-MM-DD` form
pub fn normalize_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

/// Parse user-supplied date text
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, which is reduced to its
/// UTC calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| eyre!("Invalid date '{}'. Use YYYY-MM-DD (e.g., '2024-05-01')", input))
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Buy milk \n"), Some("Buy milk".to_string()));
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text(" \t "), None);
    }

    #[test]
    fn test_normalize_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(normalize_date(Some(date)), Some("2024-05-01".to_string()));
        assert_eq!(normalize_date(None), None);
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(parse_date("2024-05-01").unwrap(), expected);
        assert_eq!(parse_date(" 2024-05-01 ").unwrap(), expected);
        assert_eq!(parse_date("2024-05-01T08:30:00Z").unwrap(), expected);
        // Converted to UTC before taking the date
        assert_eq!(parse_date("2024-05-01T23:30:00-02:00").unwrap(), NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert!(parse_date("05/01/2024").is_err());
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_complete_sets_message_once() {
        let mut task = Task::new(1, "Buy milk".to_string(), None);
        assert!(task.complete());
        assert!(task.completed);
        assert_eq!(task.completion_message.as_deref(), Some(COMPLETION_MESSAGE));
        assert!(!task.complete());
        assert_eq!(task.completion_message.as_deref(), Some(COMPLETION_MESSAGE));
    }

    #[test]
    fn test_due_parses_canonical_only() {
        let task = Task::new(1, "a".to_string(), Some("2024-06-01".to_string()));
        assert_eq!(task.due(), NaiveDate::from_ymd_opt(2024, 6, 1));
        let task = Task::new(2, "b".to_string(), Some("June".to_string()));
        assert_eq!(task.due(), None);
    }
}
