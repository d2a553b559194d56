//! Task record.

use crate::model::record::{require_text, Record, RecordId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Display format of `Task::date`; also accepted as input.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Dated task with a completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    /// Free-form; may be empty.
    pub description: String,
    /// Due date, already formatted for display.
    pub date: String,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Builds a validated, not-yet-done task due on `due`.
    pub fn new(title: &str, description: &str, due: NaiveDate) -> Result<Self, ValidationError> {
        let title = require_text(title, ValidationError::EmptyTitle)?;
        Ok(Self {
            id: RecordId::generate(),
            title,
            description: description.trim().to_string(),
            date: due.format(DUE_DATE_FORMAT).to_string(),
            done: false,
        })
    }

    /// Returns this task with `done` flipped.
    pub fn toggled(self) -> Self {
        Self {
            done: !self.done,
            ..self
        }
    }
}

impl Record for Task {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Parses user-supplied due date text.
pub fn parse_due_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse_due_date, Task};
    use crate::model::record::ValidationError;
    use chrono::NaiveDate;

    fn due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn new_task_starts_not_done_and_allows_empty_description() {
        let task = Task::new("ship", "", due()).unwrap();
        assert!(!task.done);
        assert_eq!(task.description, "");
        assert_eq!(task.date, "2026-10-19");
    }

    #[test]
    fn new_task_rejects_blank_title() {
        assert_eq!(
            Task::new("   ", "x", due()).unwrap_err(),
            ValidationError::EmptyTitle
        );
    }

    #[test]
    fn toggling_twice_restores_done_false() {
        let task = Task::new("ship", "", due()).unwrap();
        let once = task.clone().toggled();
        assert!(once.done);
        let twice = once.toggled();
        assert_eq!(twice, task);
    }

    #[test]
    fn missing_done_field_defaults_to_false() {
        let task: Task = serde_json::from_str(
            r#"{"id":"1","title":"t","description":"d","date":"2026-10-19"}"#,
        )
        .unwrap();
        assert!(!task.done);
    }

    #[test]
    fn parse_due_date_accepts_iso_and_rejects_garbage() {
        assert_eq!(parse_due_date(" 2026-10-19 ").unwrap(), due());
        assert!(matches!(
            parse_due_date("19/10/2026"),
            Err(ValidationError::InvalidDate(value)) if value == "19/10/2026"
        ));
    }
}
