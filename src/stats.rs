//! Aggregate statistics for the dashboard overview.

use crate::health::SessionHealth;
use crate::types::{Outcome, Task, TaskType};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const TOP_TOOLS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerCount {
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCount {
    pub tool: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: usize,
    /// Percentage, 0-100.
    pub success_rate: f64,
    pub avg_tasks_per_day: f64,
    pub top_trigger_types: Vec<TriggerCount>,
    pub top_tools: Vec<ToolCount>,
    pub recent_health: Option<SessionHealth>,
}

pub fn dashboard_stats(tasks: &[Task], sessions: &[SessionHealth]) -> DashboardStats {
    let total = tasks.len();
    let successes = tasks
        .iter()
        .filter(|t| t.outcome == Outcome::Success)
        .count();
    let success_rate = if total > 0 {
        successes as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let days: HashSet<_> = tasks.iter().map(|t| t.timestamp.date_naive()).collect();
    let avg_tasks_per_day = if days.is_empty() {
        0.0
    } else {
        total as f64 / days.len() as f64
    };

    DashboardStats {
        total_tasks: total,
        success_rate,
        avg_tasks_per_day,
        top_trigger_types: trigger_counts(tasks),
        top_tools: tool_counts(tasks),
        recent_health: sessions.last().cloned(),
    }
}

fn trigger_counts(tasks: &[Task]) -> Vec<TriggerCount> {
    let mut order: Vec<TaskType> = Vec::new();
    let mut counts: HashMap<TaskType, usize> = HashMap::new();
    for task in tasks {
        let count = counts.entry(task.kind).or_insert_with(|| {
            order.push(task.kind);
            0
        });
        *count += 1;
    }
    let mut result: Vec<TriggerCount> = order
        .into_iter()
        .map(|kind| TriggerCount {
            kind,
            count: counts[&kind],
        })
        .collect();
    // Stable sort keeps first-seen order among ties.
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

fn tool_counts(tasks: &[Task]) -> Vec<ToolCount> {
    let mut result: Vec<ToolCount> = Vec::new();
    for tool in tasks.iter().flat_map(|t| t.tools.iter()) {
        match result.iter_mut().find(|c| &c.tool == tool) {
            Some(c) => c.count += 1,
            None => result.push(ToolCount {
                tool: tool.clone(),
                count: 1,
            }),
        }
    }
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result.truncate(TOP_TOOLS);
    result
}
