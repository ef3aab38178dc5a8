//! Task log access: the append-only `tasks.jsonl`.

use super::{DataStore, TASKS_FILE};
use crate::error::StoreResult;
use crate::prompts;
use crate::types::{AnnotatedTask, NewTask, Task};
use chrono::Utc;
use tracing::info;

impl DataStore {
    /// All tasks in log order.
    pub fn tasks(&self) -> StoreResult<Vec<Task>> {
        self.read_jsonl(TASKS_FILE)
    }

    /// All tasks with prompt rewrites attached. Recomputed on every call.
    pub fn annotated_tasks(&self) -> StoreResult<Vec<AnnotatedTask>> {
        Ok(prompts::annotate(&self.tasks()?))
    }

    /// The last `limit` tasks, newest first, with rewrites attached.
    pub fn recent_tasks(&self, limit: usize) -> StoreResult<Vec<AnnotatedTask>> {
        let tasks = self.tasks()?;
        let start = tasks.len().saturating_sub(limit);
        let mut recent = prompts::annotate(&tasks[start..]);
        recent.reverse();
        Ok(recent)
    }

    /// Look up one task by id, with its rewrite attached.
    pub fn task_by_id(&self, id: &str) -> StoreResult<Option<AnnotatedTask>> {
        Ok(self
            .tasks()?
            .iter()
            .find(|t| t.id == id)
            .map(prompts::annotate_one))
    }

    /// Stamp and append a task, returning the stored record.
    pub fn append_task(&self, task: NewTask) -> StoreResult<Task> {
        let task = task.into_task(Utc::now());
        self.append_jsonl(TASKS_FILE, &task)?;
        info!(task_id = %task.id, outcome = task.outcome.as_str(), "Task logged");
        Ok(task)
    }
}
