//! Groups tasks into known projects and matches them against repositories.

use crate::types::{GitHubRepo, Task};
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

pub const OTHER_PROJECT: &str = "other";

/// Display metadata and matchers for a known project.
pub struct ProjectDef {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    patterns: Vec<Regex>,
}

impl ProjectDef {
    fn new(
        id: &'static str,
        name: &'static str,
        emoji: &'static str,
        description: &'static str,
        patterns: &[&str],
    ) -> Self {
        Self {
            id,
            name,
            emoji,
            description,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("project pattern must compile"))
                .collect(),
        }
    }

    fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

/// Known projects, checked in order. The first match wins.
pub static PROJECTS: LazyLock<Vec<ProjectDef>> = LazyLock::new(|| {
    vec![
        ProjectDef::new(
            "morning-brief",
            "Morning Brief",
            "☀️",
            "Daily morning updates with weather, calendar, and news",
            &[r"(?i)morning brief"],
        ),
        ProjectDef::new(
            "afternoon-research",
            "Afternoon Research",
            "📚",
            "Daily research reports on rotating topics",
            &[r"(?i)afternoon research", r"(?i)research report"],
        ),
        ProjectDef::new(
            "repo-scout",
            "Repo Scout",
            "🔍",
            "Finding acquisition-worthy project ideas",
            &[r"(?i)repo scout"],
        ),
        ProjectDef::new(
            "arb-bot",
            "Arb Bot",
            "📊",
            "Arbitrage opportunity scanning and reporting",
            &[r"(?i)arb bot", r"(?i)arbitrage", r"(?i)arb-bot"],
        ),
        ProjectDef::new(
            "direct-chat",
            "Direct Chat",
            "💬",
            "Direct conversations and ad-hoc tasks",
            &[r"(?i)imessage", r"^\[Queued"],
        ),
        ProjectDef::new(
            "dashboard",
            "Dashboard",
            "🎯",
            "Building and maintaining this dashboard",
            &[r"(?i)dashboard"],
        ),
    ]
});

/// A project with its tasks, newest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub task_count: usize,
    pub last_activity: Option<DateTime<Utc>>,
    pub tasks: Vec<Task>,
}

impl Project {
    pub fn label(&self) -> String {
        format!("{} {}", self.emoji, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStats {
    pub total_projects: usize,
    pub most_active_project: String,
    pub tasks_by_project: Vec<ProjectCount>,
}

/// Id of the first known project whose patterns match "trigger summary".
pub fn project_id_for(task: &Task) -> &'static str {
    let combined = format!("{} {}", task.trigger, task.summary);
    PROJECTS
        .iter()
        .find(|p| p.matches(&combined))
        .map(|p| p.id)
        .unwrap_or(OTHER_PROJECT)
}

pub fn group_by_project(tasks: &[Task]) -> Vec<Project> {
    let mut order: Vec<&'static str> = Vec::new();
    let mut groups: HashMap<&'static str, Vec<Task>> = HashMap::new();
    for task in tasks {
        let id = project_id_for(task);
        if !groups.contains_key(id) {
            order.push(id);
        }
        groups.entry(id).or_default().push(task.clone());
    }

    let mut projects: Vec<Project> = order
        .into_iter()
        .filter_map(|id| groups.remove(id).map(|tasks| (id, tasks)))
        .map(|(id, mut tasks)| {
            tasks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            let (name, emoji, description) = match PROJECTS.iter().find(|p| p.id == id) {
                Some(def) => (def.name, def.emoji, def.description),
                None => ("Other Tasks", "📦", "Miscellaneous tasks"),
            };
            Project {
                id: id.to_string(),
                name: name.to_string(),
                emoji: emoji.to_string(),
                description: description.to_string(),
                task_count: tasks.len(),
                last_activity: tasks.first().map(|t| t.timestamp),
                tasks,
            }
        })
        .collect();

    projects.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
    projects
}

pub fn project_stats(projects: &[Project]) -> ProjectStats {
    let mut tasks_by_project: Vec<ProjectCount> = projects
        .iter()
        .map(|p| ProjectCount {
            name: p.label(),
            count: p.task_count,
        })
        .collect();
    tasks_by_project.sort_by(|a, b| b.count.cmp(&a.count));

    ProjectStats {
        total_projects: projects.len(),
        most_active_project: tasks_by_project
            .first()
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "None".to_string()),
        tasks_by_project,
    }
}

/// A repository with the tasks that mention it.
#[derive(Debug, Clone, Serialize)]
pub struct RepoTasks {
    pub repo: GitHubRepo,
    pub tasks: Vec<Task>,
}

fn mentions_repo(task: &Task, repo_name: &str) -> bool {
    let text = format!("{} {}", task.summary, task.trigger).to_lowercase();
    let name = repo_name.to_lowercase();
    text.contains(&name)
        || text.contains(&name.replace('-', " "))
        || text.contains(&name.replace('-', ""))
}

/// Pair every repo with the tasks mentioning it, in repo order.
pub fn match_tasks_to_repos(repos: &[GitHubRepo], tasks: &[Task]) -> Vec<RepoTasks> {
    repos
        .iter()
        .map(|repo| RepoTasks {
            repo: repo.clone(),
            tasks: tasks
                .iter()
                .filter(|t| mentions_repo(t, &repo.name))
                .cloned()
                .collect(),
        })
        .collect()
}

/// Tasks that mention none of the repos.
pub fn unmatched_tasks(matched: &[RepoTasks], tasks: &[Task]) -> Vec<Task> {
    let ids: HashSet<&str> = matched
        .iter()
        .flat_map(|r| r.tasks.iter().map(|t| t.id.as_str()))
        .collect();
    tasks
        .iter()
        .filter(|t| !ids.contains(t.id.as_str()))
        .cloned()
        .collect()
}
