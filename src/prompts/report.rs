//! Cross-prompt effectiveness report.

use super::classifier::PromptAnalysis;
use super::patterns::PATTERNS;
use serde::{Deserialize, Serialize};

/// Mean success rate of prompts with and without one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternEffectiveness {
    pub pattern: String,
    pub avg_success_with: f64,
    pub avg_success_without: f64,
}

/// One row per library pattern, in library order. Empty groups average to 0.
pub fn compare_effectiveness(analyses: &[PromptAnalysis]) -> Vec<PatternEffectiveness> {
    PATTERNS
        .iter()
        .map(|pattern| {
            let (with, without): (Vec<&PromptAnalysis>, Vec<&PromptAnalysis>) =
                analyses.iter().partition(|a| a.has_pattern(pattern.name));
            PatternEffectiveness {
                pattern: pattern.name.to_string(),
                avg_success_with: mean_success(&with),
                avg_success_without: mean_success(&without),
            }
        })
        .collect()
}

fn mean_success(analyses: &[&PromptAnalysis]) -> f64 {
    if analyses.is_empty() {
        return 0.0;
    }
    analyses.iter().map(|a| a.success_rate).sum::<f64>() / analyses.len() as f64
}
