// todostore - Task list with durable local persistence

pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod slot;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use error::TaskError;
pub use models::{COMPLETION_MESSAGE, Draft, Task, TaskId, normalize_date, now_ms, parse_date};
pub use slot::{FileSlot, MemorySlot, Slot};
pub use store::{DEFAULT_KEY, Submitted, TaskListStore};
