//! Secondary collections: prompt analyses, session health, to-dos, the
//! cached GitHub repo listing and cron job definitions.

use super::{
    CRON_JOBS_FILE, DataStore, PROMPTS_FILE, REPOS_FILE, SESSIONS_FILE, TODOS_FILE,
};
use crate::error::StoreResult;
use crate::health::SessionHealth;
use crate::prompts::PromptAnalysis;
use crate::types::{CronJob, GitHubRepo, RawGitHubRepo, Todo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A prompt analysis as stored in `prompts.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedPromptAnalysis {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub analysis: PromptAnalysis,
}

#[derive(Debug, Default, Deserialize)]
struct CronJobsFile {
    #[serde(default)]
    jobs: Vec<CronJob>,
}

fn generate_prompt_id(now: DateTime<Utc>) -> String {
    use petname::{Generator, Petnames};

    let suffix = Petnames::small()
        .generate_one(2, "-")
        .unwrap_or_else(|| format!("{:06}", now.timestamp_subsec_micros()));
    format!("prompt_{}_{}", now.timestamp_millis(), suffix)
}

impl DataStore {
    /// Append an analysis to the prompt log.
    pub fn log_prompt_analysis(&self, analysis: &PromptAnalysis) -> StoreResult<LoggedPromptAnalysis> {
        let now = Utc::now();
        let record = LoggedPromptAnalysis {
            id: generate_prompt_id(now),
            timestamp: now,
            analysis: analysis.clone(),
        };
        self.append_jsonl(PROMPTS_FILE, &record)?;
        debug!(prompt_id = %record.id, patterns = ?record.analysis.patterns, "Prompt analysis logged");
        Ok(record)
    }

    pub fn prompt_analyses(&self) -> StoreResult<Vec<LoggedPromptAnalysis>> {
        self.read_jsonl(PROMPTS_FILE)
    }

    /// Append a session health snapshot.
    pub fn log_session_health(&self, health: &SessionHealth) -> StoreResult<()> {
        self.append_jsonl(SESSIONS_FILE, health)?;
        debug!(session = %health.session_key, score = health.health_score, "Session health logged");
        Ok(())
    }

    /// Session health snapshots in log order; the last one is the most recent.
    pub fn sessions(&self) -> StoreResult<Vec<SessionHealth>> {
        self.read_jsonl(SESSIONS_FILE)
    }

    pub fn todos(&self) -> StoreResult<Vec<Todo>> {
        self.read_jsonl(TODOS_FILE)
    }

    pub fn todos_by_project(&self, project: &str) -> StoreResult<Vec<Todo>> {
        Ok(self
            .todos()?
            .into_iter()
            .filter(|t| t.project == project)
            .collect())
    }

    /// Distinct to-do project names in first-seen order.
    pub fn todo_projects(&self) -> StoreResult<Vec<String>> {
        let mut projects: Vec<String> = Vec::new();
        for todo in self.todos()? {
            if !projects.contains(&todo.project) {
                projects.push(todo.project);
            }
        }
        Ok(projects)
    }

    /// The cached `gh repo list` output.
    pub fn repos(&self) -> StoreResult<Vec<GitHubRepo>> {
        let raw: Vec<RawGitHubRepo> = self.read_json(REPOS_FILE)?;
        Ok(raw.into_iter().map(GitHubRepo::from).collect())
    }

    pub fn cron_jobs(&self) -> StoreResult<Vec<CronJob>> {
        let file: CronJobsFile = self.read_json(CRON_JOBS_FILE)?;
        Ok(file.jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{SessionMetrics, calculate_session_health};
    use crate::prompts;
    use tempfile::TempDir;

    fn store() -> (TempDir, DataStore) {
        let temp = TempDir::new().unwrap();
        let store = DataStore::open(temp.path());
        (temp, store)
    }

    #[test]
    fn prompt_analysis_round_trips_through_log() {
        let (_temp, store) = store();
        let analysis = prompts::analyze("do it", &[]);
        let logged = store.log_prompt_analysis(&analysis).unwrap();
        assert!(logged.id.starts_with("prompt_"));

        let all = store.prompt_analyses().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].analysis, analysis);

        let raw = std::fs::read_to_string(store.dir().join(PROMPTS_FILE)).unwrap();
        assert!(raw.contains("\"originalPrompt\":\"do it\""));
    }

    #[test]
    fn sessions_keep_log_order() {
        let (_temp, store) = store();
        let now = Utc::now();
        for key in ["first", "second"] {
            let metrics = SessionMetrics {
                session_key: key.into(),
                start_time: now,
                turn_count: 1,
                clarification_requests: 0,
                task_failures: 0,
                repetitions: 0,
            };
            store
                .log_session_health(&calculate_session_health(&metrics, now))
                .unwrap();
        }
        let sessions = store.sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[1].session_key, "second");
    }

    #[test]
    fn todos_group_by_project() {
        let (temp, store) = store();
        let line = |id: &str, project: &str| {
            format!(
                r#"{{"id":"{id}","project":"{project}","title":"t","status":"in-progress","priority":"high","createdAt":"2025-01-01","updatedAt":"2025-01-01"}}"#
            )
        };
        std::fs::write(
            temp.path().join(TODOS_FILE),
            [line("1", "arb-bot"), line("2", "dashboard"), line("3", "arb-bot")].join("\n"),
        )
        .unwrap();

        assert_eq!(store.todos().unwrap().len(), 3);
        assert_eq!(store.todos_by_project("arb-bot").unwrap().len(), 2);
        assert_eq!(store.todo_projects().unwrap(), vec!["arb-bot", "dashboard"]);
    }

    #[test]
    fn repos_and_cron_jobs_decode_documents() {
        let (temp, store) = store();
        std::fs::write(
            temp.path().join(REPOS_FILE),
            r#"[{"name":"repo-scout","url":"u","updatedAt":"2025-01-01","stargazerCount":2,"isPrivate":false}]"#,
        )
        .unwrap();
        std::fs::write(
            temp.path().join(CRON_JOBS_FILE),
            r#"{"jobs":[{"id":"j1","name":"Morning Brief","enabled":true,"schedule":{"kind":"cron","expr":"0 8 * * *","tz":"UTC"},"nextRunAtMs":1738400000000}]}"#,
        )
        .unwrap();

        let repos = store.repos().unwrap();
        assert_eq!(repos[0].name, "repo-scout");
        assert_eq!(repos[0].stars, 2);
        assert!(repos[0].language.is_none());

        let jobs = store.cron_jobs().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].schedule.expr, "0 8 * * *");
        assert!(jobs[0].last_status.is_none());
    }

    #[test]
    fn missing_documents_are_empty() {
        let (_temp, store) = store();
        assert!(store.repos().unwrap().is_empty());
        assert!(store.cron_jobs().unwrap().is_empty());
        assert!(store.todo_projects().unwrap().is_empty());
    }
}
