//! HTML fragments rendered for htmx requests.
//!
//! Every function here is pure: data in, markup out. The handlers in
//! `server` load the data and pick `now`.

use crate::health::{SessionHealth, health_label};
use crate::projects::{Project, ProjectStats, RepoTasks};
use crate::prompts::{PatternEffectiveness, PromptAnalysis};
use crate::schedule::{
    self, describe_cron, events_for_week, format_run_time, group_events_by_date, time_ago,
    time_until, upcoming_jobs, week_start,
};
use crate::stats::{DashboardStats, ToolCount};
use crate::types::{AnnotatedTask, CronJob, Outcome, Task, Todo, TodoStatus};
use chrono::{DateTime, Duration, TimeZone, Utc};

const NEXT_UP_LIMIT: usize = 5;

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn empty(message: &str) -> String {
    format!(r#"<div class="empty-state">{}</div>"#, message)
}

fn outcome_emoji(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Success => "✅",
        Outcome::Partial => "⚠️",
        Outcome::Failed => "❌",
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn task_link(task: &Task) -> String {
    format!("/api/tasks/{}", urlencoding::encode(&task.id))
}

pub fn stats(stats: &DashboardStats) -> String {
    format!(
        r#"
        <div class="grid grid-stats">
            <div class="card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Total Tasks</div>
            </div>
            <div class="card">
                <div class="stat-value">{:.0}%</div>
                <div class="stat-label">Success Rate</div>
            </div>
            <div class="card">
                <div class="stat-value">{:.1}</div>
                <div class="stat-label">Tasks / Day</div>
            </div>
            <div class="card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Top Trigger</div>
            </div>
        </div>
    "#,
        stats.total_tasks,
        stats.success_rate,
        stats.avg_tasks_per_day,
        stats
            .top_trigger_types
            .first()
            .map(|t| t.kind.as_str())
            .unwrap_or("-"),
    )
}

pub fn health(health: Option<&SessionHealth>) -> String {
    let Some(health) = health else {
        return empty("No session health recorded");
    };

    let mut html = format!(
        r#"<div class="card"><div class="stat-value {}">{}</div><div class="stat-label">{} &middot; {} turns &middot; {}</div>"#,
        health_label(health.health_score),
        health.health_score,
        html_escape(&health.session_key),
        health.turn_count,
        health.recommendation.as_str(),
    );
    if !health.signals.is_empty() {
        html.push_str("<ul>");
        for signal in &health.signals {
            html.push_str(&format!("<li class=\"muted\">{}</li>", html_escape(&signal.message)));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

pub fn tools(tools: &[ToolCount]) -> String {
    let Some(max) = tools.first().map(|t| t.count) else {
        return empty("No tool usage yet");
    };

    let mut html = String::from("<table><tbody>");
    for tool in tools {
        let width = tool.count * 100 / max.max(1);
        html.push_str(&format!(
            r#"<tr><td>{}</td><td style="width:50%"><div class="bar" style="width:{}%"></div></td><td>{}</td></tr>"#,
            html_escape(&tool.tool),
            width,
            tool.count
        ));
    }
    html.push_str("</tbody></table>");
    html
}

fn task_row(task: &AnnotatedTask, now: DateTime<Utc>) -> String {
    let improved = match &task.improved_prompt {
        Some(prompt) => format!(
            "<details><summary class=\"muted\">Suggested prompt</summary><pre>{}</pre><div class=\"muted\">{}</div></details>",
            html_escape(prompt),
            html_escape(&task.improvement_notes)
        ),
        None => format!("<div class=\"muted\">{}</div>", html_escape(&task.improvement_notes)),
    };
    format!(
        r#"<tr><td>{}</td><td><span class="badge badge-{}">{}</span></td><td><a href="{}">{}</a><div class="muted">{}</div>{}</td><td class="muted">{}</td></tr>"#,
        outcome_emoji(task.task.outcome),
        task.task.kind.as_str(),
        task.task.kind.as_str(),
        task_link(&task.task),
        html_escape(&truncate(&task.task.summary, 160)),
        html_escape(&truncate(&crate::prompts::clean_prompt(&task.task.trigger), 120)),
        improved,
        time_ago(task.task.timestamp, now),
    )
}

pub fn recent_tasks(tasks: &[AnnotatedTask], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return empty("No tasks logged yet");
    }
    let mut html = String::from(
        "<table><thead><tr><th></th><th>Type</th><th>Task</th><th>When</th></tr></thead><tbody>",
    );
    for task in tasks {
        html.push_str(&task_row(task, now));
    }
    html.push_str("</tbody></table>");
    html
}

/// Three-column board: open and in-progress to-dos, then completed tasks.
pub fn kanban(todos: &[Todo], completed: &[AnnotatedTask], now: DateTime<Utc>) -> String {
    let todo_cards = |status: TodoStatus| -> Vec<String> {
        todos
            .iter()
            .filter(|t| t.status == status)
            .map(|t| {
                format!(
                    r#"<div class="card kanban-card">{}<div class="muted">{}</div></div>"#,
                    html_escape(&t.title),
                    html_escape(&t.project)
                )
            })
            .collect()
    };
    let done_cards: Vec<String> = completed
        .iter()
        .map(|t| {
            format!(
                r#"<div class="card kanban-card">{} {}<div class="muted">{} &middot; {}</div></div>"#,
                outcome_emoji(t.task.outcome),
                html_escape(&truncate(&t.task.summary, 100)),
                t.task.kind.as_str(),
                time_ago(t.task.timestamp, now)
            )
        })
        .collect();

    let columns = [
        ("📋 To Do", todo_cards(TodoStatus::Todo)),
        ("🔄 In Progress", todo_cards(TodoStatus::InProgress)),
        ("✅ Completed", done_cards),
    ];

    let mut html = String::from(r#"<div class="grid grid-3">"#);
    for (title, cards) in columns {
        html.push_str(&format!(
            r#"<div><h2>{} <span class="muted">{}</span></h2>"#,
            title,
            cards.len()
        ));
        if cards.is_empty() {
            html.push_str(&empty("No tasks"));
        } else {
            html.push_str(&cards.concat());
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

pub fn analysis(analysis: &PromptAnalysis) -> String {
    let patterns = if analysis.patterns.is_empty() {
        "none".to_string()
    } else {
        analysis
            .patterns
            .iter()
            .map(|p| format!(r#"<span class="badge">{}</span>"#, html_escape(p)))
            .collect::<Vec<_>>()
            .join(" ")
    };
    let mut html = format!(
        r#"<p>Patterns: {}</p><p class="muted">Severity {} &middot; success rate {:.0}% over {} tasks</p>"#,
        patterns,
        analysis.severity.as_str(),
        analysis.success_rate * 100.0,
        analysis.task_ids.len()
    );
    if let (Some(improved), Some(reason)) =
        (&analysis.suggested_improvement, &analysis.improvement_reason)
    {
        html.push_str(&format!(
            "<p>{}</p><pre>{}</pre>",
            html_escape(reason),
            html_escape(improved)
        ));
    }
    html
}

pub fn effectiveness(rows: &[PatternEffectiveness]) -> String {
    let mut html = String::from(
        "<table><thead><tr><th>Pattern</th><th>Success with</th><th>Success without</th></tr></thead><tbody>",
    );
    for row in rows {
        let class = if row.avg_success_with < row.avg_success_without {
            "poor"
        } else {
            "good"
        };
        html.push_str(&format!(
            r#"<tr><td>{}</td><td class="{}">{:.0}%</td><td>{:.0}%</td></tr>"#,
            html_escape(&row.pattern),
            class,
            row.avg_success_with * 100.0,
            row.avg_success_without * 100.0
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Analyzed prompts, worst success rate first.
pub fn prompts(analyses: &[PromptAnalysis]) -> String {
    if analyses.is_empty() {
        return empty("No prompts to analyze");
    }
    let mut sorted: Vec<&PromptAnalysis> = analyses.iter().collect();
    sorted.sort_by(|a, b| a.success_rate.total_cmp(&b.success_rate));

    let mut html = String::from(
        "<table><thead><tr><th>Prompt</th><th>Patterns</th><th>Success</th></tr></thead><tbody>",
    );
    for a in sorted {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td class="muted">{}</td><td>{:.0}% <span class="muted">({})</span></td></tr>"#,
            html_escape(&truncate(&crate::prompts::clean_prompt(&a.original_prompt), 120)),
            html_escape(&a.patterns.join(", ")),
            a.success_rate * 100.0,
            a.task_ids.len()
        ));
    }
    html.push_str("</tbody></table>");
    html
}

pub fn next_up(jobs: &[CronJob], now: DateTime<Utc>) -> String {
    let upcoming = upcoming_jobs(jobs, NEXT_UP_LIMIT);
    if upcoming.is_empty() {
        return empty("No scheduled jobs");
    }
    let mut html = String::from("<table><tbody>");
    for job in &upcoming {
        let Some(next) = job
            .next_run_at_ms
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        else {
            continue;
        };
        html.push_str(&format!(
            r#"<tr><td>{}</td><td class="muted">{}</td><td class="muted">{}</td><td>{}</td></tr>"#,
            html_escape(&job.name),
            html_escape(&describe_cron(&job.schedule.expr)),
            format_run_time(next),
            time_until(next, now)
        ));
    }
    html.push_str("</tbody></table>");
    html
}

/// Seven day columns starting on the Sunday of the current week.
pub fn calendar(jobs: &[CronJob], now: DateTime<Utc>) -> String {
    let start = week_start(now);
    let grouped = group_events_by_date(&events_for_week(jobs, start));

    let mut html = String::from(
        r#"<div class="grid" style="grid-template-columns: repeat(7, minmax(0, 1fr));">"#,
    );
    for offset in 0..7 {
        let day = start + Duration::days(offset);
        let date = day.date_naive();
        let today = date == now.date_naive();
        html.push_str(&format!(
            r#"<div class="card"><div class="{}">{}</div>"#,
            if today { "stat-label good" } else { "stat-label" },
            day.format("%a %-d")
        ));
        match grouped.get(&date) {
            Some(events) => {
                for event in events {
                    html.push_str(&format!(
                        r#"<div class="kanban-card"><span class="badge badge-{}">{}</span> {}</div>"#,
                        event.status.as_str(),
                        event.time.format("%H:%M"),
                        html_escape(&event.title)
                    ));
                }
            }
            None => html.push_str(r#"<div class="muted">-</div>"#),
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");

    let mut legend = String::from(r#"<p class="muted">"#);
    for job in jobs.iter().filter(|j| j.enabled) {
        let days = schedule::job_days(job);
        legend.push_str(&format!(
            "{}: {} ({} days/week)<br>",
            html_escape(&job.name),
            html_escape(&describe_cron(&job.schedule.expr)),
            days.len()
        ));
    }
    legend.push_str("</p>");
    html.push_str(&legend);
    html
}

pub fn project_stats(stats: &ProjectStats) -> String {
    format!(
        r#"
        <div class="grid grid-stats">
            <div class="card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Projects</div>
            </div>
            <div class="card">
                <div class="stat-value">{}</div>
                <div class="stat-label">Most Active</div>
            </div>
        </div>
    "#,
        stats.total_projects,
        html_escape(&stats.most_active_project)
    )
}

pub fn projects(projects: &[Project], now: DateTime<Utc>) -> String {
    if projects.is_empty() {
        return empty("No projects yet");
    }
    let mut html = String::from(r#"<div class="grid grid-3">"#);
    for project in projects {
        let last = project
            .last_activity
            .map(|t| time_ago(t, now))
            .unwrap_or_default();
        html.push_str(&format!(
            r#"<div class="card"><div><strong>{}</strong></div><div class="muted">{}</div><p>{} tasks &middot; <span class="muted">{}</span></p><ul>"#,
            html_escape(&project.label()),
            html_escape(&project.description),
            project.task_count,
            last
        ));
        for task in project.tasks.iter().take(3) {
            html.push_str(&format!(
                r#"<li class="muted">{} {}</li>"#,
                outcome_emoji(task.outcome),
                html_escape(&truncate(&task.summary, 80))
            ));
        }
        html.push_str("</ul></div>");
    }
    html.push_str("</div>");
    html
}

pub fn repos(matched: &[RepoTasks], unmatched: &[Task], now: DateTime<Utc>) -> String {
    if matched.is_empty() {
        return empty("No repositories cached");
    }
    let mut html = String::from("<table><tbody>");
    for entry in matched {
        let repo = &entry.repo;
        html.push_str(&format!(
            r#"<tr><td><a href="{}">{}</a>{}<div class="muted">{}</div></td><td class="muted">{}</td><td>{}</td></tr>"#,
            html_escape(&repo.url),
            html_escape(&repo.name),
            if repo.is_private { " 🔒" } else { "" },
            html_escape(repo.language.as_deref().unwrap_or("")),
            DateTime::parse_from_rfc3339(&repo.updated_at)
                .map(|t| time_ago(t.with_timezone(&Utc), now))
                .unwrap_or_default(),
            entry.tasks.len()
        ));
    }
    html.push_str(&format!(
        r#"<tr><td>Other</td><td></td><td>{}</td></tr>"#,
        unmatched.len()
    ));
    html.push_str("</tbody></table>");
    html
}

pub fn todos(projects: &[String], todos: &[Todo]) -> String {
    if todos.is_empty() {
        return empty("No to-dos");
    }
    let mut html = String::from(r#"<div class="grid grid-3">"#);
    for project in projects {
        html.push_str(&format!(
            r#"<div class="card"><strong>{}</strong><ul>"#,
            html_escape(project)
        ));
        for todo in todos.iter().filter(|t| &t.project == project) {
            let mark = match todo.status {
                TodoStatus::Todo => "📋",
                TodoStatus::InProgress => "🔄",
                TodoStatus::Done => "✅",
            };
            html.push_str(&format!("<li>{} {}</li>", mark, html_escape(&todo.title)));
        }
        html.push_str("</ul></div>");
    }
    html.push_str("</div>");
    html
}

pub fn error(message: &str) -> String {
    format!(r#"<div class="error-message">{}</div>"#, html_escape(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TaskType, TodoPriority};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 5, 12, 0, 0).unwrap()
    }

    fn annotated(id: &str, summary: &str, improved: Option<&str>) -> AnnotatedTask {
        AnnotatedTask {
            task: Task {
                id: id.into(),
                timestamp: now() - Duration::hours(2),
                kind: TaskType::Direct,
                trigger: "[iMessage +1555] <b>fix</b> it".into(),
                summary: summary.into(),
                outcome: Outcome::Failed,
                duration_ms: None,
                tools: vec![],
                session_key: None,
            },
            improved_prompt: improved.map(str::to_string),
            improvement_notes: "Added success criteria.".into(),
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn recent_tasks_render_rewrite_and_escape() {
        let html = recent_tasks(&[annotated("task 1", "<script>", Some("Fix it"))], now());
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Suggested prompt"));
        assert!(html.contains("/api/tasks/task%201"));
        assert!(html.contains("2h ago"));
        // Trigger is shown cleaned of channel markers.
        assert!(!html.contains("iMessage"));
    }

    #[test]
    fn empty_inputs_render_empty_state() {
        assert!(recent_tasks(&[], now()).contains("empty-state"));
        assert!(health(None).contains("No session health"));
        assert!(tools(&[]).contains("empty-state"));
        assert!(prompts(&[]).contains("empty-state"));
        assert!(next_up(&[], now()).contains("No scheduled jobs"));
    }

    #[test]
    fn kanban_counts_columns() {
        let todos = vec![Todo {
            id: "1".into(),
            project: "dashboard".into(),
            title: "Ship it".into(),
            status: TodoStatus::InProgress,
            priority: TodoPriority::High,
            created_at: String::new(),
            updated_at: String::new(),
            notes: None,
        }];
        let html = kanban(&todos, &[annotated("a", "done", None)], now());
        assert!(html.contains("📋 To Do <span class=\"muted\">0</span>"));
        assert!(html.contains("🔄 In Progress <span class=\"muted\">1</span>"));
        assert!(html.contains("✅ Completed <span class=\"muted\">1</span>"));
    }

    #[test]
    fn calendar_has_seven_days() {
        let html = calendar(&[], now());
        assert_eq!(html.matches(r#"<div class="card">"#).count(), 7);
        // 2025-02-05 is a Wednesday; the week starts Sunday the 2nd.
        assert!(html.contains("Sun 2"));
        assert!(html.contains("Sat 8"));
    }
}
