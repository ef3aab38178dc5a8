//! Prompt classifier: pattern detection plus historical success rate.

use super::patterns::{self, PATTERNS, Severity};
use crate::types::{Outcome, Task};
use serde::{Deserialize, Serialize};

/// Below this success rate a flagged prompt gets a suggested rewrite.
pub const IMPROVEMENT_THRESHOLD: f64 = 0.8;

/// Result of analyzing one prompt against the task history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptAnalysis {
    pub original_prompt: String,
    /// Matched pattern names, in pattern-library order.
    pub patterns: Vec<String>,
    /// Worst severity among matched patterns; `info` when none matched.
    #[serde(default)]
    pub severity: Severity,
    /// Fraction of exactly-matching tasks that succeeded; 1.0 with no history.
    pub success_rate: f64,
    /// Tasks whose trigger equals `original_prompt`.
    #[serde(default)]
    pub task_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_improvement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_reason: Option<String>,
}

impl PromptAnalysis {
    pub fn has_pattern(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p == name)
    }
}

/// Analyze `prompt` against the pattern library and the task history.
pub fn analyze(prompt: &str, tasks: &[Task]) -> PromptAnalysis {
    let mut matched = Vec::new();
    let mut severity = Severity::Info;
    for pattern in PATTERNS.iter().filter(|p| p.matches(prompt)) {
        matched.push(pattern.name.to_string());
        severity = severity.max(pattern.severity);
    }

    let related: Vec<&Task> = tasks.iter().filter(|t| t.trigger == prompt).collect();
    let success_rate = if related.is_empty() {
        1.0
    } else {
        let successes = related
            .iter()
            .filter(|t| t.outcome == Outcome::Success)
            .count();
        successes as f64 / related.len() as f64
    };

    let (suggested_improvement, improvement_reason) =
        match matched.first().and_then(|name| patterns::find(name)) {
            Some(main) if success_rate < IMPROVEMENT_THRESHOLD => (
                Some(suggest_edit(prompt, &matched)),
                Some(main.suggestion.to_string()),
            ),
            _ => (None, None),
        };

    PromptAnalysis {
        original_prompt: prompt.to_string(),
        patterns: matched,
        severity,
        success_rate,
        task_ids: related.iter().map(|t| t.id.clone()).collect(),
        suggested_improvement,
        improvement_reason,
    }
}

/// Analyze every distinct trigger in `tasks`, in first-seen order.
pub fn analyze_all(tasks: &[Task]) -> Vec<PromptAnalysis> {
    let mut seen = std::collections::HashSet::new();
    let mut analyses = Vec::new();
    for task in tasks {
        if seen.insert(task.trigger.as_str()) {
            analyses.push(analyze(&task.trigger, tasks));
        }
    }
    analyses
}

// Independent edits keyed on the full matched set.
fn suggest_edit(original: &str, matched: &[String]) -> String {
    let has = |name: &str| matched.iter().any(|m| m == name);
    let mut improved = original.to_string();

    if has(patterns::VAGUE_GOAL) {
        improved.push_str("\n\nSuccess criteria: [SPECIFY WHAT DONE LOOKS LIKE]");
    }
    if has(patterns::MISSING_CONTEXT) {
        improved = format!("Context: [WHY THIS MATTERS]\n\n{}", improved);
    }
    if has(patterns::NO_CONSTRAINTS) {
        improved.push_str("\n\nConstraints: [LIMITS/BOUNDARIES]");
    }

    improved
}
