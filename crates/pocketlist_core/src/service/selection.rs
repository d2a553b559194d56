//! Expanded-row selection shared by both screens.

use crate::model::record::RecordId;

/// At most one record of a list is expanded at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSelection {
    current: Option<RecordId>,
}

impl ExpandedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands `id`, or collapses it when it is already expanded.
    ///
    /// Returns the record expanded afterwards.
    pub fn toggle(&mut self, id: &str) -> Option<&RecordId> {
        if self.is_expanded(id) {
            self.current = None;
        } else {
            self.current = Some(RecordId::from(id));
        }
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&RecordId> {
        self.current.as_ref()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.current
            .as_ref()
            .is_some_and(|current| current.as_str() == id)
    }

    /// Collapses the selection when it points at `id`.
    pub(crate) fn forget(&mut self, id: &str) {
        if self.is_expanded(id) {
            self.current = None;
        }
    }
}
