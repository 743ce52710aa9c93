// Terminal rendering of task rows

use crate::models::{Draft, Task};
use crate::slot::Slot;
use crate::store::TaskListStore;
use colored::Colorize;

/// Render one task as a list row
pub fn render_task(task: &Task, editing: bool) -> String {
    let mut lines = Vec::new();

    let marker = if editing {
        "[editing]".yellow().bold().to_string()
    } else if task.completed {
        "Task Completed".green().to_string()
    } else {
        "[ ]".to_string()
    };
    let text = if task.completed {
        task.text.dimmed().to_string()
    } else {
        task.text.clone()
    };
    lines.push(format!("{:>15}  {}  {}", task.id.to_string().cyan(), marker, text));

    if let Some(due) = &task.due_date {
        lines.push(format!("{:>15}  Due Date: {}", "", due));
    }
    if let Some(message) = task.completion_message.as_deref().filter(|_| task.completed) {
        lines.push(format!("{:>15}  {}", "", message.green()));
    }

    lines.join("\n")
}

/// Render the whole list in order
pub fn render_list<S: Slot>(store: &TaskListStore<S>) -> String {
    if store.is_empty() {
        return "No tasks".dimmed().to_string();
    }
    store
        .tasks()
        .iter()
        .map(|t| render_task(t, store.is_editing(t.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the draft a user should edit
pub fn render_draft(draft: &Draft) -> String {
    match draft.due {
        Some(due) => format!("{} (due {})", draft.text, due.format(crate::models::DATE_FORMAT)),
        None => draft.text.clone(),
    }
}
