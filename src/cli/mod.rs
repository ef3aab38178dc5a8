//! CLI command definitions for agent-dashboard
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod log;
pub mod report;

use crate::health::SessionMetrics;
use crate::types::{Outcome, TaskType};
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Parser, Subcommand};
use self::log::LogArgs;
use self::report::ReportArgs;

/// Agent activity dashboard and prompt analysis tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to data directory (overrides config)
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Port for the web dashboard (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web dashboard (default if no subcommand given)
    Serve,

    /// Append a task record to the task log
    Log(LogArgs),

    /// Rewrite a prompt into a more structured form
    Improve(ImproveArgs),

    /// Analyze a prompt against the task history
    Analyze(AnalyzeArgs),

    /// Print pattern effectiveness across all logged prompts
    Report(ReportArgs),

    /// Score a session's health and optionally record it
    Health(HealthArgs),

    /// Print dashboard statistics as JSON
    Stats,
}

/// Arguments for the improve subcommand
#[derive(Args, Debug)]
pub struct ImproveArgs {
    /// Prompt text to rewrite
    pub prompt: String,

    /// Comma-separated tools the task used
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,

    /// Outcome of the task the prompt triggered
    #[arg(long, default_value = "success", value_parser = parse_outcome)]
    pub outcome: Outcome,
}

/// Arguments for the analyze subcommand
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Prompt text to analyze
    pub prompt: String,

    /// Append the analysis to the prompt log
    #[arg(long)]
    pub record: bool,
}

/// Arguments for the health subcommand
#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Session key
    #[arg(long, default_value = "main")]
    pub session: String,

    /// Minutes since the session started
    #[arg(long, default_value_t = 0)]
    pub age_minutes: u32,

    /// Number of conversation turns
    #[arg(long, default_value_t = 0)]
    pub turns: u32,

    #[arg(long, default_value_t = 0)]
    pub clarifications: u32,

    #[arg(long, default_value_t = 0)]
    pub failures: u32,

    #[arg(long, default_value_t = 0)]
    pub repetitions: u32,

    /// Append the result to the session log
    #[arg(long)]
    pub record: bool,
}

impl HealthArgs {
    pub fn metrics(&self, now: DateTime<Utc>) -> SessionMetrics {
        SessionMetrics {
            session_key: self.session.clone(),
            start_time: now - Duration::minutes(i64::from(self.age_minutes)),
            turn_count: self.turns,
            clarification_requests: self.clarifications,
            task_failures: self.failures,
            repetitions: self.repetitions,
        }
    }
}

pub(crate) fn parse_outcome(s: &str) -> Result<Outcome, String> {
    Outcome::from_str(s).ok_or_else(|| format!("invalid outcome '{}': expected success, partial or failed", s))
}

pub(crate) fn parse_task_type(s: &str) -> Result<TaskType, String> {
    TaskType::from_str(s)
        .ok_or_else(|| format!("invalid type '{}': expected cron, direct, heartbeat or spawn", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["agent-dashboard"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["agent-dashboard", "stats", "--data-dir", "/tmp/d", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Stats)));
        assert_eq!(cli.data_dir.as_deref(), Some("/tmp/d"));
        assert!(cli.verbose);
    }

    #[test]
    fn improve_parses_tools_and_outcome() {
        let cli = Cli::try_parse_from([
            "agent-dashboard",
            "improve",
            "fix the build",
            "--tools",
            "exec,read",
            "--outcome",
            "failed",
        ])
        .unwrap();
        let Some(Command::Improve(args)) = cli.command else {
            panic!("expected improve");
        };
        assert_eq!(args.tools, vec!["exec", "read"]);
        assert_eq!(args.outcome, Outcome::Failed);
    }

    #[test]
    fn health_args_build_metrics() {
        let cli = Cli::try_parse_from([
            "agent-dashboard",
            "health",
            "--turns",
            "60",
            "--age-minutes",
            "90",
            "--record",
        ])
        .unwrap();
        let Some(Command::Health(args)) = cli.command else {
            panic!("expected health");
        };
        let now = Utc::now();
        let metrics = args.metrics(now);
        assert_eq!(metrics.session_key, "main");
        assert_eq!(metrics.turn_count, 60);
        assert_eq!(now - metrics.start_time, Duration::minutes(90));
        assert!(args.record);
    }

    #[test]
    fn health_age_is_bounded() {
        for bad in ["9223372036854775807", "-5"] {
            assert!(
                Cli::try_parse_from(["agent-dashboard", "health", "--age-minutes", bad]).is_err(),
                "accepted {}",
                bad
            );
        }

        let cli = Cli::try_parse_from(["agent-dashboard", "health", "--age-minutes", "4294967295"])
            .unwrap();
        let Some(Command::Health(args)) = cli.command else {
            panic!("expected health");
        };
        let now = Utc::now();
        assert!(args.metrics(now).start_time < now);
    }

    #[test]
    fn rejects_unknown_outcome() {
        assert!(Cli::try_parse_from(["agent-dashboard", "improve", "x", "--outcome", "meh"]).is_err());
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
