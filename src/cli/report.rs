//! Report subcommand: pattern effectiveness across every distinct trigger.

use crate::prompts::{PatternEffectiveness, PromptAnalysis};
use clap::{Args, ValueEnum};

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

/// Arguments for the report subcommand
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    pub format: ReportFormat,
}

/// Render the effectiveness table.
pub fn render(
    format: ReportFormat,
    analyses: &[PromptAnalysis],
    rows: &[PatternEffectiveness],
) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ReportFormat::Markdown => Ok(markdown(analyses.len(), rows)),
    }
}

fn markdown(prompt_count: usize, rows: &[PatternEffectiveness]) -> String {
    let mut out = format!("# Prompt pattern effectiveness\n\n{} distinct prompts analyzed.\n\n", prompt_count);
    out.push_str("| Pattern | Success with | Success without |\n");
    out.push_str("|---|---:|---:|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {:.0}% | {:.0}% |\n",
            row.pattern,
            row.avg_success_with * 100.0,
            row.avg_success_without * 100.0
        ));
    }
    out
}
