//! Log subcommand: append one task to `tasks.jsonl`.

use super::{parse_outcome, parse_task_type};
use crate::types::{NewTask, Outcome, TaskType};
use clap::Args;

/// Arguments for the log subcommand
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Task type: cron, direct, heartbeat or spawn
    #[arg(long = "type", default_value = "direct", value_parser = parse_task_type)]
    pub kind: TaskType,

    /// Prompt or cron description that triggered the task
    #[arg(long, default_value = "manual")]
    pub trigger: String,

    /// What was accomplished
    #[arg(long, default_value = "Task completed")]
    pub summary: String,

    /// Outcome: success, partial or failed
    #[arg(long, default_value = "success", value_parser = parse_outcome)]
    pub outcome: Outcome,

    /// Comma-separated tools used
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,

    /// Duration in milliseconds
    #[arg(long, value_name = "MS")]
    pub duration: Option<u64>,

    /// Session key
    #[arg(long)]
    pub session: Option<String>,
}

impl From<LogArgs> for NewTask {
    fn from(args: LogArgs) -> Self {
        NewTask {
            kind: args.kind,
            trigger: args.trigger,
            summary: args.summary,
            outcome: args.outcome,
            duration_ms: args.duration,
            tools: args
                .tools
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            session_key: args.session,
        }
    }
}
