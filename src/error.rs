// Error taxonomy for task list operations

use crate::models::TaskId;
use thiserror::Error;

/// Errors raised by [`crate::TaskListStore`] operations
///
/// None of these are fatal: the in-memory list stays valid after any of them.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task text was empty or whitespace-only after trimming
    #[error("Task cannot be empty")]
    EmptyText,

    /// No task with this id is in the list
    #[error("Task {0} not found")]
    NotFound(TaskId),

    /// An edit was committed while no task is in editing mode
    #[error("No task is being edited")]
    NotEditing,

    /// An edit was committed for a task other than the one being edited
    #[error("Task {requested} is not being edited (task {editing} is)")]
    StaleEdit { requested: TaskId, editing: TaskId },

    /// No larger task id is left to assign
    #[error("No task ids left to assign")]
    IdsExhausted,

    /// The list could not be written to the slot; the change was discarded
    #[error("Failed to persist task list")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TaskError {
    /// True for errors caused by caller input that can be corrected and retried
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::EmptyText)
    }
}

impl From<eyre::Report> for TaskError {
    fn from(report: eyre::Report) -> Self {
        TaskError::Storage(report.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_messages() {
        assert_eq!(TaskError::EmptyText.to_string(), "Task cannot be empty");
        assert_eq!(TaskError::NotFound(42).to_string(), "Task 42 not found");
        assert_eq!(
            TaskError::StaleEdit { requested: 1, editing: 2 }.to_string(),
            "Task 1 is not being edited (task 2 is)"
        );
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let err: TaskError = eyre::eyre!("disk full").into();
        assert!(matches!(err, TaskError::Storage(_)));
        assert_eq!(err.source().unwrap().to_string(), "disk full");
        assert!(!err.is_validation());
        assert!(TaskError::EmptyText.is_validation());
    }
}
