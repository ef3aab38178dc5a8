//! Batch annotation of tasks with prompt rewrites.

use super::rewriter::{clean_prompt, rewrite};
use crate::types::{AnnotatedTask, Task};

/// Attach a rewrite to a copy of every task, preserving order.
pub fn annotate(tasks: &[Task]) -> Vec<AnnotatedTask> {
    tasks.iter().map(annotate_one).collect()
}

/// Attach a rewrite to a single task.
///
/// `improved_prompt` is left empty when the rewrite is just the cleaned
/// trigger, so consumers only see rewrites that change something.
pub fn annotate_one(task: &Task) -> AnnotatedTask {
    let rewrite = rewrite(&task.trigger, &task.tools, task.outcome);
    let improved_prompt =
        (rewrite.improved_prompt != clean_prompt(&task.trigger)).then_some(rewrite.improved_prompt);

    AnnotatedTask {
        task: task.clone(),
        improved_prompt,
        improvement_notes: rewrite.notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, TaskType};
    use chrono::Utc;

    fn task(id: &str, trigger: &str, tools: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            timestamp: Utc::now(),
            kind: TaskType::Cron,
            trigger: trigger.to_string(),
            summary: format!("summary {}", id),
            outcome: Outcome::Success,
            duration_ms: Some(10),
            tools: tools.iter().map(|s| s.to_string()).collect(),
            session_key: None,
        }
    }

    #[test]
    fn preserves_order_and_fields() {
        let tasks = vec![task("a", "hi", &[]), task("b", "fix", &["exec"])];
        let annotated = annotate(&tasks);

        assert_eq!(annotated.len(), 2);
        assert_eq!(annotated[0].task, tasks[0]);
        assert_eq!(annotated[1].task, tasks[1]);
    }

    #[test]
    fn unchanged_rewrites_are_omitted() {
        let tasks = vec![
            task("a", "[message_id: 9] hi", &[]),
            task("b", "fix", &[]),
        ];
        let annotated = annotate(&tasks);

        assert!(annotated[0].improved_prompt.is_none());
        assert_eq!(
            annotated[0].improvement_notes,
            "Simple greeting - no improvement needed."
        );
        assert!(
            annotated[1]
                .improved_prompt
                .as_deref()
                .is_some_and(|p| p.contains("Expected:"))
        );
    }

    #[test]
    fn empty_input() {
        assert!(annotate(&[]).is_empty());
    }
}
