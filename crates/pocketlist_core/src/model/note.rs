//! Note record.

use crate::model::record::{require_text, Record, RecordId, ValidationError};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Display format of `Note::created_at`.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Free-form note with an immutable creation stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    /// Local creation time, already formatted for display.
    pub created_at: String,
}

impl Note {
    /// Builds a validated note stamped with `at`.
    ///
    /// Title and description are trimmed; both must be non-empty.
    pub fn new(
        title: &str,
        description: &str,
        at: DateTime<Local>,
    ) -> Result<Self, ValidationError> {
        let title = require_text(title, ValidationError::EmptyTitle)?;
        let description = require_text(description, ValidationError::EmptyDescription)?;
        Ok(Self {
            id: RecordId::generate(),
            title,
            description,
            created_at: at.format(CREATED_AT_FORMAT).to_string(),
        })
    }
}

impl Record for Note {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use crate::model::record::ValidationError;
    use chrono::{Local, TimeZone};

    #[test]
    fn new_formats_created_at_and_trims_input() {
        let at = Local.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
        let note = Note::new(" Title ", " body ", at).unwrap();
        assert_eq!(note.title, "Title");
        assert_eq!(note.description, "body");
        assert_eq!(note.created_at, "2026-03-09 07:05:01");
    }

    #[test]
    fn new_rejects_blank_fields() {
        let at = Local::now();
        assert_eq!(
            Note::new("", "body", at).unwrap_err(),
            ValidationError::EmptyTitle
        );
        assert_eq!(
            Note::new("title", "  ", at).unwrap_err(),
            ValidationError::EmptyDescription
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let at = Local.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let note = Note::new("a", "b", at).unwrap();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["createdAt"], "2026-01-01 00:00:00");
        assert!(json.get("created_at").is_none());
    }
}
