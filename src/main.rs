//! Agent Dashboard
//!
//! Web dashboard and command-line tools for an agent's activity log:
//! task history, prompt pattern analysis, session health and schedules.

use agent_dashboard::cli::report;
use agent_dashboard::cli::{AnalyzeArgs, Cli, Command, HealthArgs, ImproveArgs};
use agent_dashboard::config::{CONFIG_PATH_ENV, Config, ConfigLoader};
use agent_dashboard::dashboard::{self, DashboardStatus};
use agent_dashboard::health::calculate_session_health;
use agent_dashboard::logging::{self, LogTarget};
use agent_dashboard::prompts;
use agent_dashboard::stats::dashboard_stats;
use agent_dashboard::store::DataStore;
use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    // If explicit config path given, set it as env var for ConfigLoader to pick up
    // SAFETY: This is safe at program startup before any other threads are spawned
    if let Some(config_path) = &cli.config {
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, config_path);
        }
    }
    let mut loader = ConfigLoader::load()?;
    if let Some(path) = loader.config_path() {
        debug!(config = %path.display(), "Using config file");
    }

    // Override settings from CLI arguments
    let config = loader.config_mut();
    if let Some(data_dir) = &cli.data_dir {
        config.server.data_dir = data_dir.into();
    }
    if let Some(port) = cli.port {
        config.server.ui.port = port;
    }
    let config = loader.into_config();

    let store = DataStore::open(&config.server.data_dir);

    match cli.command {
        Some(Command::Log(args)) => {
            let task = store.append_task(args.into())?;
            println!("Logged task: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Some(Command::Improve(args)) => run_improve(args),
        Some(Command::Analyze(args)) => run_analyze(&store, args)?,
        Some(Command::Report(args)) => {
            let analyses = prompts::analyze_all(&store.tasks()?);
            let rows = prompts::compare_effectiveness(&analyses);
            print!("{}", report::render(args.format, &analyses, &rows)?);
        }
        Some(Command::Health(args)) => run_health(&store, args)?,
        Some(Command::Stats) => {
            let stats = dashboard_stats(&store.tasks()?, &store.sessions()?);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Some(Command::Serve) | None => run_server(store, config).await?,
    }

    Ok(())
}

fn run_improve(args: ImproveArgs) {
    let rewrite = prompts::rewrite(&args.prompt, &args.tools, args.outcome);
    println!("{}", rewrite.improved_prompt);
    println!();
    println!("Notes: {}", rewrite.notes);
}

fn run_analyze(store: &DataStore, args: AnalyzeArgs) -> Result<()> {
    let analysis = prompts::analyze(&args.prompt, &store.tasks()?);
    if args.record {
        let logged = store.log_prompt_analysis(&analysis)?;
        info!(id = %logged.id, "Recorded prompt analysis");
    }
    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

fn run_health(store: &DataStore, args: HealthArgs) -> Result<()> {
    let now = Utc::now();
    let health = calculate_session_health(&args.metrics(now), now);
    if args.record {
        store.log_session_health(&health)?;
        info!(session = %health.session_key, score = health.health_score, "Recorded session health");
    }
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

/// Run the web dashboard until interrupted.
async fn run_server(store: DataStore, config: Config) -> Result<()> {
    info!(data_dir = %store.dir().display(), "Starting agent dashboard");

    let mut handle = dashboard::start_server_with_retry(
        store,
        &config.server.ui,
        Arc::new(config.dashboard.clone()),
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
                break;
            }
            status = handle.changed() => {
                if status == DashboardStatus::Stopped {
                    break;
                }
            }
        }
    }

    handle.shutdown();
    Ok(())
}
