// Task list store: in-memory list mirrored into a persistence slot

use crate::error::TaskError;
use crate::models::{Draft, Task, TaskId, clean_text, normalize_date, now_ms};
use crate::slot::Slot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Slot key the task list is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "todos";

/// Outcome of [`TaskListStore::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(TaskId),
    Updated(TaskId),
}

/// Wire form of a task inside the persistence slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTask {
    id: TaskId,
    task: String,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completion_message: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    editing: bool,
}

/// Ordered task list that persists itself after every mutation
///
/// The list is read from the slot once in [`TaskListStore::load`] and the
/// whole list is written back after each successful mutating operation.
/// At most one task is in editing mode; the store holds its id rather than
/// flagging records.
pub struct TaskListStore<S: Slot> {
    slot: S,
    key: String,
    tasks: Vec<Task>,
    editing: Option<TaskId>,
    last_id: TaskId,
}

impl<S: Slot> TaskListStore<S> {
    /// Load the task list stored under [`DEFAULT_KEY`]
    pub fn load(slot: S) -> Self {
        Self::load_with_key(slot, DEFAULT_KEY)
    }

    /// Load the task list stored under `key`
    ///
    /// Never fails: a missing, unreadable or malformed value yields an empty list.
    pub fn load_with_key(slot: S, key: &str) -> Self {
        let records = read_records(&slot, key);

        let mut tasks = Vec::with_capacity(records.len());
        let mut editing = None;
        for record in records {
            if record.editing {
                if editing.is_none() {
                    editing = Some(record.id);
                } else {
                    warn!(key, id = record.id, "Ignoring second task flagged as editing");
                }
            }
            tasks.push(Task {
                id: record.id,
                text: record.task,
                due_date: record.due_date,
                completed: record.completed,
                completion_message: record.completion_message,
            });
        }

        let last_id = tasks.iter().map(|t| t.id).max().unwrap_or(0);
        info!(key, count = tasks.len(), "Loaded task list");

        Self {
            slot,
            key: key.to_string(),
            tasks,
            editing,
            last_id,
        }
    }

    // ========================================================================
    // Read API
    // ========================================================================

    /// All tasks in insertion order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Id of the task currently in editing mode
    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        self.editing == Some(id)
    }

    /// Due date of the task in editing mode, to carry over into a save
    pub fn editing_due(&self) -> Option<NaiveDate> {
        self.editing.and_then(|id| self.get(id)).and_then(Task::due)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Append a new task
    ///
    /// If the slot write fails the task is not kept, so the call can be retried.
    pub fn add(&mut self, text: &str, due: Option<NaiveDate>) -> Result<TaskId, TaskError> {
        let text = clean_text(text).ok_or(TaskError::EmptyText)?;
        let id = self.next_id()?;

        let snapshot = self.snapshot();
        self.tasks.push(Task::new(id, text, normalize_date(due)));
        debug!(id, count = self.tasks.len(), "add: appended task");

        self.persist_or_restore(snapshot)?;
        Ok(id)
    }

    /// Put a task into editing mode, taking editing mode away from any other
    ///
    /// Returns the task's current text and date for the entry fields.
    /// If the slot write fails the previous editing mode is restored.
    pub fn begin_edit(&mut self, id: TaskId) -> Result<Draft, TaskError> {
        let task = self.get(id).ok_or(TaskError::NotFound(id))?;
        let draft = Draft {
            text: task.text.clone(),
            due: task.due(),
        };

        let snapshot = self.snapshot();
        match self.editing.replace(id) {
            Some(previous) if previous != id => debug!(id, previous, "begin_edit: switched editing task"),
            _ => debug!(id, "begin_edit: editing task"),
        }

        self.persist_or_restore(snapshot)?;
        Ok(draft)
    }

    /// Apply new text and date to the task in editing mode and leave editing mode
    ///
    /// `id` must name the task being edited; a different id is rejected with
    /// [`TaskError::StaleEdit`] and nothing changes. A `due` of `None` clears
    /// the due date. If the slot write fails the task keeps its old values and
    /// stays in editing mode.
    pub fn commit_edit(&mut self, id: TaskId, text: &str, due: Option<NaiveDate>) -> Result<(), TaskError> {
        let text = clean_text(text).ok_or(TaskError::EmptyText)?;
        let editing = self.editing.ok_or(TaskError::NotEditing)?;
        if editing != id {
            return Err(TaskError::StaleEdit { requested: id, editing });
        }

        let snapshot = self.snapshot();
        let task = self.get_mut(id).ok_or(TaskError::NotFound(id))?;
        task.text = text;
        task.due_date = normalize_date(due);
        self.editing = None;
        debug!(id, "commit_edit: updated task");

        self.persist_or_restore(snapshot)
    }

    /// Leave editing mode without changing any task
    ///
    /// Returns false, without persisting, when no task was being edited.
    /// If the slot write fails the task stays in editing mode.
    pub fn cancel_edit(&mut self) -> Result<bool, TaskError> {
        let snapshot = self.snapshot();
        match self.editing.take() {
            Some(id) => {
                debug!(id, "cancel_edit: left editing mode");
                self.persist_or_restore(snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Primary entry action: save the task being edited, or add a new one
    pub fn submit(&mut self, text: &str, due: Option<NaiveDate>) -> Result<Submitted, TaskError> {
        match self.editing {
            Some(id) => {
                self.commit_edit(id, text, due)?;
                Ok(Submitted::Updated(id))
            }
            None => self.add(text, due).map(Submitted::Added),
        }
    }

    /// Mark a task completed
    ///
    /// Completing an already-completed task is a no-op. If the slot write
    /// fails the task is left open.
    pub fn complete(&mut self, id: TaskId) -> Result<(), TaskError> {
        let snapshot = self.snapshot();
        let task = self.get_mut(id).ok_or(TaskError::NotFound(id))?;
        if !task.complete() {
            debug!(id, "complete: already completed");
            return Ok(());
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        debug!(id, "complete: marked completed");

        self.persist_or_restore(snapshot)
    }

    /// Remove a task, keeping the order of the rest
    ///
    /// Deleting an id that is not in the list is a no-op, not an error.
    /// Returns whether a task was removed. If the slot write fails the task
    /// is put back.
    pub fn delete(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            debug!(id, "delete: no such task");
            return Ok(false);
        };

        let snapshot = self.snapshot();
        self.tasks.remove(index);
        if self.editing == Some(id) {
            self.editing = None;
        }
        debug!(id, count = self.tasks.len(), "delete: removed task");

        self.persist_or_restore(snapshot)?;
        Ok(true)
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn next_id(&mut self) -> Result<TaskId, TaskError> {
        let next = self.last_id.checked_add(1).ok_or(TaskError::IdsExhausted)?;
        let id = now_ms().max(next);
        self.last_id = id;
        Ok(id)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            editing: self.editing,
        }
    }

    fn encode(&self) -> Result<String, TaskError> {
        let records: Vec<StoredTask> = self
            .tasks
            .iter()
            .map(|t| StoredTask {
                id: t.id,
                task: t.text.clone(),
                due_date: t.due_date.clone(),
                completed: t.completed,
                completion_message: t.completion_message.clone(),
                editing: self.editing == Some(t.id),
            })
            .collect();

        serde_json::to_string(&records).map_err(|e| TaskError::Storage(Box::new(e)))
    }

    fn persist(&mut self) -> Result<(), TaskError> {
        let json = self.encode()?;
        self.slot.write(&self.key, &json)?;
        Ok(())
    }

    /// Persist, or roll memory back to `snapshot` if the write fails
    fn persist_or_restore(&mut self, snapshot: Snapshot) -> Result<(), TaskError> {
        if let Err(e) = self.persist() {
            warn!(key = %self.key, error = %e, "Failed to persist task list, change discarded");
            self.tasks = snapshot.tasks;
            self.editing = snapshot.editing;
            return Err(e);
        }
        Ok(())
    }
}

/// In-memory state saved before a mutation
struct Snapshot {
    tasks: Vec<Task>,
    editing: Option<TaskId>,
}

fn read_records<S: Slot>(slot: &S, key: &str) -> Vec<StoredTask> {
    let content = match slot.read(key) {
        Ok(Some(content)) => content,
        Ok(None) => {
            debug!(key, "No stored task list, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = ?e, "Failed to read task list, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<StoredTask>>>(&content) {
        Ok(records) => records.unwrap_or_default(),
        Err(e) => {
            warn!(key, error = ?e, "Failed to parse task list, starting empty");
            Vec::new()
        }
    }
}
