//! Core record types for the agent dashboard.
//!
//! Field names follow the JSON Lines files written by the agent's task logger
//! (camelCase keys, lowercase enum values).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What caused a task to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Cron,
    #[default]
    Direct,
    Heartbeat,
    Spawn,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Cron => "cron",
            TaskType::Direct => "direct",
            TaskType::Heartbeat => "heartbeat",
            TaskType::Spawn => "spawn",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cron" => Some(TaskType::Cron),
            "direct" => Some(TaskType::Direct),
            "heartbeat" => Some(TaskType::Heartbeat),
            "spawn" => Some(TaskType::Spawn),
            _ => None,
        }
    }
}

/// Terminal result of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    #[default]
    Success,
    Partial,
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Partial => "partial",
            Outcome::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "success" => Some(Outcome::Success),
            "partial" => Some(Outcome::Partial),
            "failed" => Some(Outcome::Failed),
            _ => None,
        }
    }
}

/// A task record from `tasks.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TaskType,
    /// The prompt or cron description that triggered this task.
    pub trigger: String,
    /// What was accomplished.
    pub summary: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

/// A task as submitted by the logger, before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub trigger: String,
    pub summary: String,
    pub outcome: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
}

impl NewTask {
    /// Stamp the task with `now` and a fresh `task_<millis>_<petname>` id.
    pub fn into_task(self, now: DateTime<Utc>) -> Task {
        Task {
            id: generate_task_id(now),
            timestamp: now,
            kind: self.kind,
            trigger: self.trigger,
            summary: self.summary,
            outcome: self.outcome,
            duration_ms: self.duration_ms,
            tools: self.tools,
            session_key: self.session_key,
        }
    }
}

/// Generate a task id from the timestamp plus a short random petname suffix.
pub fn generate_task_id(now: DateTime<Utc>) -> String {
    use petname::{Generator, Petnames};

    let suffix = Petnames::small()
        .generate_one(2, "-")
        .unwrap_or_else(|| format!("{:06}", now.timestamp_subsec_micros()));
    format!("task_{}_{}", now.timestamp_millis(), suffix)
}

/// A task with the prompt rewrite attached for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTask {
    #[serde(flatten)]
    pub task: Task,
    /// Rewritten prompt; absent when the rewrite is just the cleaned trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improved_prompt: Option<String>,
    pub improvement_notes: String,
}

/// Status column of a to-do item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TodoStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoPriority {
    Low,
    Medium,
    High,
}

/// A to-do item from `todos.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub project: String,
    pub title: String,
    pub status: TodoStatus,
    pub priority: TodoPriority,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A repository from the cached GitHub listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepo {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    pub updated_at: String,
    pub language: Option<String>,
    pub stars: u64,
    pub is_private: bool,
}

/// Raw shape written by `gh repo list --json ...`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGitHubRepo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub primary_language: Option<RawLanguage>,
    #[serde(default)]
    pub stargazer_count: Option<u64>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLanguage {
    pub name: String,
}

impl From<RawGitHubRepo> for GitHubRepo {
    fn from(raw: RawGitHubRepo) -> Self {
        Self {
            name: raw.name,
            description: raw.description,
            url: raw.url,
            updated_at: raw.updated_at,
            language: raw.primary_language.map(|l| l.name),
            stars: raw.stargazer_count.unwrap_or(0),
            is_private: raw.is_private,
        }
    }
}

/// Schedule of a recurring job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CronSchedule {
    pub kind: String,
    pub expr: String,
    #[serde(default)]
    pub tz: String,
}

/// A recurring job definition from `cron-jobs.json`. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub schedule: CronSchedule,
    #[serde(default)]
    pub next_run_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run_at_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn task_decodes_logger_line() {
        let line = r#"{"id":"task_1","timestamp":"2025-01-30T08:00:00.000Z","type":"cron","trigger":"Morning Brief","summary":"Sent brief","outcome":"success","tools":["web_search","message"],"durationMs":1200}"#;
        let task: Task = serde_json::from_str(line).unwrap();
        assert_eq!(task.kind, TaskType::Cron);
        assert_eq!(task.outcome, Outcome::Success);
        assert_eq!(task.duration_ms, Some(1200));
        assert_eq!(task.tools, vec!["web_search", "message"]);
        assert!(task.session_key.is_none());
    }

    #[test]
    fn task_serializes_camel_case() {
        let task = NewTask {
            kind: TaskType::Spawn,
            trigger: "t".into(),
            summary: "s".into(),
            outcome: Outcome::Partial,
            duration_ms: Some(5),
            tools: vec![],
            session_key: Some("main".into()),
        }
        .into_task(Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap());

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["type"], "spawn");
        assert_eq!(json["outcome"], "partial");
        assert_eq!(json["durationMs"], 5);
        assert_eq!(json["sessionKey"], "main");
        assert!(task.id.starts_with("task_1738411200000_"));
    }

    #[test]
    fn annotated_task_omits_missing_rewrite() {
        let task: Task = serde_json::from_str(
            r#"{"id":"a","timestamp":"2025-01-01T00:00:00Z","type":"direct","trigger":"hi","summary":"","outcome":"success"}"#,
        )
        .unwrap();
        let annotated = AnnotatedTask {
            task,
            improved_prompt: None,
            improvement_notes: "Simple greeting - no improvement needed.".into(),
        };
        let json = serde_json::to_value(&annotated).unwrap();
        assert!(json.get("improvedPrompt").is_none());
        assert_eq!(json["trigger"], "hi");
        assert_eq!(
            json["improvementNotes"],
            "Simple greeting - no improvement needed."
        );
    }

    #[test]
    fn github_repo_from_cli_shape() {
        let raw: RawGitHubRepo = serde_json::from_str(
            r#"{"name":"arb-bot","description":null,"url":"https://github.com/x/arb-bot","updatedAt":"2025-01-01","primaryLanguage":{"name":"Rust"},"stargazerCount":3,"isPrivate":true}"#,
        )
        .unwrap();
        let repo = GitHubRepo::from(raw);
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert_eq!(repo.stars, 3);
        assert!(repo.is_private);
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!(TaskType::from_str("Heartbeat"), Some(TaskType::Heartbeat));
        assert_eq!(Outcome::from_str("FAILED"), Some(Outcome::Failed));
        assert_eq!(Outcome::from_str("done"), None);
    }
}
