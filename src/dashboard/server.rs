//! HTTP server implementation for the web dashboard.
//!
//! This module provides the axum-based HTTP server that serves the dashboard
//! pages, the htmx fragments they load, and the JSON API.

use axum::{
    Router,
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Json},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::fragments;
use super::templates::{Page, render_page};
use crate::config::{DashboardConfig, UiConfig};
use crate::error::{ApiError, ApiResult, StoreResult};
use crate::projects;
use crate::prompts::{self, PatternEffectiveness, PromptAnalysis, Rewrite};
use crate::stats::{DashboardStats, dashboard_stats};
use crate::store::{DataStore, LoggedPromptAnalysis};
use crate::types::{AnnotatedTask, Outcome};

/// Recent tasks returned alongside `/api/stats`.
const STATS_RECENT_TASKS: usize = 20;

/// Dashboard server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    store: DataStore,
    port: u16,
    config: Arc<DashboardConfig>,
}

impl DashboardServer {
    pub fn new(store: DataStore, port: u16, config: Arc<DashboardConfig>) -> Self {
        Self {
            store,
            port,
            config,
        }
    }

    pub fn store(&self) -> &DataStore {
        &self.store
    }

    /// Get the configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

/// Log a store failure and fall back to an empty value so a fragment still renders.
fn or_empty<T: Default>(result: StoreResult<T>, what: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load {}", what);
        T::default()
    })
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API root - returns available endpoints.
async fn api_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "stats": "/api/stats",
            "tasks": "/api/tasks",
            "task": "/api/tasks/{id}",
            "prompts": "/api/prompts",
            "analyze": "POST /api/prompts/analyze",
            "improve": "POST /api/prompts/improve",
            "effectiveness": "/api/prompts/effectiveness",
        }
    }))
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

async fn root() -> Html<String> {
    Html(render_page(Page::Overview))
}

async fn tasks_page() -> Html<String> {
    Html(render_page(Page::Tasks))
}

async fn prompts_page() -> Html<String> {
    Html(render_page(Page::Prompts))
}

async fn schedule_page() -> Html<String> {
    Html(render_page(Page::Schedule))
}

async fn projects_page() -> Html<String> {
    Html(render_page(Page::Projects))
}

// ---------------------------------------------------------------------------
// JSON API
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    stats: DashboardStats,
    recent_tasks: Vec<AnnotatedTask>,
}

async fn api_stats(State(state): State<DashboardServer>) -> ApiResult<Json<StatsResponse>> {
    let store = state.store();
    let stats = dashboard_stats(&store.tasks()?, &store.sessions()?);
    let recent_tasks = store.recent_tasks(STATS_RECENT_TASKS)?;
    Ok(Json(StatsResponse {
        stats,
        recent_tasks,
    }))
}

async fn api_tasks(State(state): State<DashboardServer>) -> ApiResult<Json<Vec<AnnotatedTask>>> {
    let limit = state.config().recent_limit;
    Ok(Json(state.store().recent_tasks(limit)?))
}

async fn api_task(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<AnnotatedTask>> {
    state
        .store()
        .task_by_id(&task_id)?
        .map(Json)
        .ok_or_else(|| ApiError::task_not_found(&task_id))
}

/// Analyses previously recorded to the prompt log.
async fn api_prompts(
    State(state): State<DashboardServer>,
) -> ApiResult<Json<Vec<LoggedPromptAnalysis>>> {
    Ok(Json(state.store().prompt_analyses()?))
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    #[serde(default)]
    prompt: Option<String>,
}

fn required_prompt(prompt: Option<String>) -> ApiResult<String> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(ApiError::missing_field("prompt")),
    }
}

async fn api_prompts_analyze(
    State(state): State<DashboardServer>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<PromptAnalysis>> {
    let prompt = required_prompt(request.prompt)?;
    let tasks = state.store().tasks()?;
    Ok(Json(prompts::analyze(&prompt, &tasks)))
}

async fn api_prompts_effectiveness(
    State(state): State<DashboardServer>,
) -> ApiResult<Json<Vec<PatternEffectiveness>>> {
    let tasks = state.store().tasks()?;
    let analyses = prompts::analyze_all(&tasks);
    Ok(Json(prompts::compare_effectiveness(&analyses)))
}

#[derive(Debug, Deserialize)]
struct ImproveRequest {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    tools: Vec<String>,
    #[serde(default)]
    outcome: Option<String>,
}

async fn api_prompts_improve(Json(request): Json<ImproveRequest>) -> ApiResult<Json<Rewrite>> {
    let prompt = required_prompt(request.prompt)?;
    let outcome = match request.outcome.as_deref() {
        None => Outcome::default(),
        Some(s) => Outcome::from_str(s).ok_or_else(|| {
            ApiError::invalid_value("outcome", "outcome must be success, partial or failed")
        })?,
    };
    Ok(Json(prompts::rewrite(&prompt, &request.tools, outcome)))
}

// ---------------------------------------------------------------------------
// htmx fragments
// ---------------------------------------------------------------------------

async fn fragment_stats(State(state): State<DashboardServer>) -> Html<String> {
    let store = state.store();
    let stats = dashboard_stats(
        &or_empty(store.tasks(), "tasks"),
        &or_empty(store.sessions(), "sessions"),
    );
    Html(fragments::stats(&stats))
}

async fn fragment_health(State(state): State<DashboardServer>) -> Html<String> {
    let sessions = or_empty(state.store().sessions(), "sessions");
    Html(fragments::health(sessions.last()))
}

async fn fragment_tools(State(state): State<DashboardServer>) -> Html<String> {
    let stats = dashboard_stats(&or_empty(state.store().tasks(), "tasks"), &[]);
    Html(fragments::tools(&stats.top_tools))
}

async fn fragment_recent_tasks(State(state): State<DashboardServer>) -> Html<String> {
    let limit = state.config().recent_limit;
    let tasks = or_empty(state.store().recent_tasks(limit), "recent tasks");
    Html(fragments::recent_tasks(&tasks, Utc::now()))
}

async fn fragment_kanban(State(state): State<DashboardServer>) -> Html<String> {
    let store = state.store();
    let completed = or_empty(store.recent_tasks(state.config().kanban_limit), "recent tasks");
    let todos = or_empty(store.todos(), "todos");
    Html(fragments::kanban(&todos, &completed, Utc::now()))
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    prompt: String,
}

async fn fragment_analyze(
    State(state): State<DashboardServer>,
    Form(form): Form<AnalyzeForm>,
) -> Html<String> {
    if form.prompt.trim().is_empty() {
        return Html(fragments::error("Enter a prompt to analyze"));
    }
    let tasks = or_empty(state.store().tasks(), "tasks");
    Html(fragments::analysis(&prompts::analyze(&form.prompt, &tasks)))
}

async fn fragment_effectiveness(State(state): State<DashboardServer>) -> Html<String> {
    let analyses = prompts::analyze_all(&or_empty(state.store().tasks(), "tasks"));
    Html(fragments::effectiveness(&prompts::compare_effectiveness(
        &analyses,
    )))
}

async fn fragment_prompts(State(state): State<DashboardServer>) -> Html<String> {
    let analyses = prompts::analyze_all(&or_empty(state.store().tasks(), "tasks"));
    Html(fragments::prompts(&analyses))
}

async fn fragment_next_up(State(state): State<DashboardServer>) -> Html<String> {
    let jobs = or_empty(state.store().cron_jobs(), "cron jobs");
    Html(fragments::next_up(&jobs, Utc::now()))
}

async fn fragment_calendar(State(state): State<DashboardServer>) -> Html<String> {
    let jobs = or_empty(state.store().cron_jobs(), "cron jobs");
    Html(fragments::calendar(&jobs, Utc::now()))
}

async fn fragment_projects(State(state): State<DashboardServer>) -> Html<String> {
    let tasks = or_empty(state.store().tasks(), "tasks");
    Html(fragments::projects(
        &projects::group_by_project(&tasks),
        Utc::now(),
    ))
}

async fn fragment_project_stats(State(state): State<DashboardServer>) -> Html<String> {
    let tasks = or_empty(state.store().tasks(), "tasks");
    let stats = projects::project_stats(&projects::group_by_project(&tasks));
    Html(fragments::project_stats(&stats))
}

async fn fragment_repos(State(state): State<DashboardServer>) -> Html<String> {
    let store = state.store();
    let tasks = or_empty(store.tasks(), "tasks");
    let repos = or_empty(store.repos(), "repos");
    let matched = projects::match_tasks_to_repos(&repos, &tasks);
    let unmatched = projects::unmatched_tasks(&matched, &tasks);
    Html(fragments::repos(&matched, &unmatched, Utc::now()))
}

async fn fragment_todos(State(state): State<DashboardServer>) -> Html<String> {
    let store = state.store();
    let todos = or_empty(store.todos(), "todos");
    let projects = or_empty(store.todo_projects(), "todo projects");
    Html(fragments::todos(&projects, &todos))
}

/// Build the router with all routes.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(root))
        .route("/tasks", get(tasks_page))
        .route("/prompts", get(prompts_page))
        .route("/schedule", get(schedule_page))
        .route("/projects", get(projects_page))
        // JSON API
        .route("/api", get(api_root))
        .route("/api/health", get(health))
        .route("/api/stats", get(api_stats))
        .route("/api/tasks", get(api_tasks))
        .route("/api/tasks/{task_id}", get(api_task))
        .route("/api/prompts", get(api_prompts))
        .route("/api/prompts/analyze", post(api_prompts_analyze))
        .route("/api/prompts/effectiveness", get(api_prompts_effectiveness))
        .route("/api/prompts/improve", post(api_prompts_improve))
        // htmx fragment routes
        .route("/api/fragments/stats", get(fragment_stats))
        .route("/api/fragments/health", get(fragment_health))
        .route("/api/fragments/tools", get(fragment_tools))
        .route("/api/fragments/recent-tasks", get(fragment_recent_tasks))
        .route("/api/fragments/kanban", get(fragment_kanban))
        .route("/api/fragments/analyze", post(fragment_analyze))
        .route("/api/fragments/effectiveness", get(fragment_effectiveness))
        .route("/api/fragments/prompts", get(fragment_prompts))
        .route("/api/fragments/next-up", get(fragment_next_up))
        .route("/api/fragments/calendar", get(fragment_calendar))
        .route("/api/fragments/projects", get(fragment_projects))
        .route("/api/fragments/project-stats", get(fragment_project_stats))
        .route("/api/fragments/repos", get(fragment_repos))
        .route("/api/fragments/todos", get(fragment_todos))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Status of the dashboard server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    /// Dashboard is running and serving requests.
    Running,
    /// Dashboard failed to start, retrying in background.
    Retrying,
    /// Dashboard has been shut down.
    Stopped,
}

/// Handle for managing the dashboard server lifecycle.
pub struct DashboardHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    status_rx: watch::Receiver<DashboardStatus>,
}

impl DashboardHandle {
    /// Get the current status of the dashboard.
    pub fn status(&self) -> DashboardStatus {
        *self.status_rx.borrow()
    }

    /// Wait until the status changes, returning the new status.
    pub async fn changed(&mut self) -> DashboardStatus {
        let _ = self.status_rx.changed().await;
        *self.status_rx.borrow()
    }

    /// Trigger shutdown of the dashboard server.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the HTTP server on the specified port.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn start_server(
    store: DataStore,
    port: u16,
    config: Arc<DashboardConfig>,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let state = DashboardServer::new(store, port, config);
    let app = build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Dashboard server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Dashboard server shutting down");
            })
            .await
        {
            tracing::error!("Dashboard server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

/// Compute jittered delay for retry, never below one second.
/// Uses system time nanoseconds as the jitter source.
fn compute_jittered_delay(base_ms: u64, jitter_ms: u64) -> Duration {
    use std::time::SystemTime;

    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);

    // Map nanos to range [-jitter_ms, +jitter_ms)
    let jitter_range = (jitter_ms * 2) as i64;
    let jitter = if jitter_range > 0 {
        (nanos as i64 % jitter_range) - (jitter_ms as i64)
    } else {
        0
    };

    let delay_ms = (base_ms as i64 + jitter).max(1000) as u64;
    Duration::from_millis(delay_ms)
}

/// Next backoff interval, capped at `max_ms`.
fn next_delay_ms(current_ms: u64, multiplier: f64, max_ms: u64) -> u64 {
    ((current_ms as f64 * multiplier) as u64).min(max_ms)
}

/// Start the HTTP server with automatic retry on failure.
///
/// This function never fails - if the port is in use, it will retry in the background
/// with exponential backoff. Returns a handle to monitor and control the dashboard.
pub fn start_server_with_retry(
    store: DataStore,
    ui_config: &UiConfig,
    config: Arc<DashboardConfig>,
) -> DashboardHandle {
    let port = ui_config.port;
    let retry_initial_ms = ui_config.retry_initial_ms;
    let retry_jitter_ms = ui_config.retry_jitter_ms;
    let retry_max_ms = ui_config.retry_max_ms;
    let retry_multiplier = ui_config.retry_multiplier;

    let (status_tx, status_rx) = watch::channel(DashboardStatus::Retrying);
    let (handle_shutdown_tx, mut handle_shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut current_delay_ms = retry_initial_ms;

        loop {
            match handle_shutdown_rx.try_recv() {
                Ok(()) | Err(oneshot::error::TryRecvError::Closed) => {
                    info!("Dashboard retry loop shutting down");
                    let _ = status_tx.send(DashboardStatus::Stopped);
                    break;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
            }

            match start_server(store.clone(), port, Arc::clone(&config)).await {
                Ok((server_shutdown_tx, bound_addr)) => {
                    info!("Dashboard available at http://{}", bound_addr);
                    let _ = status_tx.send(DashboardStatus::Running);

                    let _ = (&mut handle_shutdown_rx).await;
                    info!("Dashboard handle shutdown received");
                    let _ = server_shutdown_tx.send(());
                    let _ = status_tx.send(DashboardStatus::Stopped);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Failed to start dashboard on port {}: {}. Retrying in {:.1}s...",
                        port,
                        e,
                        current_delay_ms as f64 / 1000.0
                    );
                    let _ = status_tx.send(DashboardStatus::Retrying);

                    let delay = compute_jittered_delay(current_delay_ms, retry_jitter_ms);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = &mut handle_shutdown_rx => {
                            info!("Dashboard retry loop shutting down");
                            let _ = status_tx.send(DashboardStatus::Stopped);
                            break;
                        }
                    }

                    current_delay_ms =
                        next_delay_ms(current_delay_ms, retry_multiplier, retry_max_ms);
                }
            }
        }
    });

    DashboardHandle {
        shutdown_tx: Some(handle_shutdown_tx),
        status_rx,
    }
}
