//! Pattern library: named heuristics that flag weak prompts.
//!
//! The table order is significant. It is the order patterns are reported in
//! and the order used to pick the "main" pattern for an improvement reason.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// How much a detected pattern matters. Ordered `Info < Warning < Error`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// A named predicate over prompt text.
///
/// `detect` receives the trimmed prompt and its lowercased form. Keyword
/// checks read the lowercased text; lengths are measured on the original.
#[derive(Debug, Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    pub detect: fn(&str, &str) -> bool,
    pub severity: Severity,
    pub suggestion: &'static str,
}

impl Pattern {
    pub fn matches(&self, prompt: &str) -> bool {
        let trimmed = prompt.trim();
        (self.detect)(trimmed, &trimmed.to_lowercase())
    }
}

pub const VAGUE_GOAL: &str = "vague-goal";
pub const MISSING_CONTEXT: &str = "missing-context";
pub const MULTI_TASK: &str = "multi-task";
pub const NO_CONSTRAINTS: &str = "no-constraints";
pub const UNCLEAR_FORMAT: &str = "unclear-format";

/// The fixed pattern table, in evaluation order.
pub static PATTERNS: [Pattern; 5] = [
    Pattern {
        name: VAGUE_GOAL,
        detect: vague_goal,
        severity: Severity::Warning,
        suggestion: "Add specific success criteria. What does \"done\" look like?",
    },
    Pattern {
        name: MISSING_CONTEXT,
        detect: missing_context,
        severity: Severity::Info,
        suggestion: "Include why you need this. Context helps prioritize and scope.",
    },
    Pattern {
        name: MULTI_TASK,
        detect: multi_task,
        severity: Severity::Warning,
        suggestion: "Consider breaking into separate tasks. Fewer goals = better focus.",
    },
    Pattern {
        name: NO_CONSTRAINTS,
        detect: no_constraints,
        severity: Severity::Info,
        suggestion: "Add constraints to prevent scope creep. \"Only X\" or \"Max Y\".",
    },
    Pattern {
        name: UNCLEAR_FORMAT,
        detect: unclear_format,
        severity: Severity::Info,
        suggestion: "Specify desired output format when it matters.",
    },
];

/// Look up a pattern by name.
pub fn find(name: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.name == name)
}

static AND_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\band\b").unwrap());
static ALSO_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\balso\b").unwrap());

/// Case-insensitive count of the standalone word "and".
pub fn and_count(text: &str) -> usize {
    AND_WORD.find_iter(text).count()
}

/// Case-insensitive count of the standalone word "also".
pub fn also_count(text: &str) -> usize {
    ALSO_WORD.find_iter(text).count()
}

fn contains_none(text: &str, needles: &[&str]) -> bool {
    !needles.iter().any(|n| text.contains(n))
}

fn vague_goal(original: &str, p: &str) -> bool {
    original.chars().count() < 50 && contains_none(p, &["specific", "exactly"])
}

fn missing_context(_: &str, p: &str) -> bool {
    contains_none(p, &["because", "context", "background"])
}

// `also` + `then` fires regardless of the "and" count.
fn multi_task(_: &str, p: &str) -> bool {
    and_count(p) > 3 || (p.contains("also") && p.contains("then"))
}

fn no_constraints(_: &str, p: &str) -> bool {
    contains_none(p, &["limit", "only", "just", "max"])
}

fn unclear_format(_: &str, p: &str) -> bool {
    contains_none(p, &["list", "table", "summary", "format"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(name: &str) -> &'static Pattern {
        find(name).unwrap()
    }

    #[test]
    fn names_are_unique_and_ordered() {
        let names: Vec<_> = PATTERNS.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec![
                VAGUE_GOAL,
                MISSING_CONTEXT,
                MULTI_TASK,
                NO_CONSTRAINTS,
                UNCLEAR_FORMAT
            ]
        );
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[test]
    fn vague_goal_checks_length_and_keywords() {
        let p = pattern(VAGUE_GOAL);
        assert!(p.matches("do the thing"));
        assert!(!p.matches("do exactly the thing"));
        assert!(!p.matches("be specific"));
        assert!(!p.matches(&"x".repeat(50)));
        // Surrounding whitespace does not count toward the length.
        assert!(p.matches(&format!("   {}   ", "y".repeat(45))));
    }

    #[test]
    fn vague_goal_length_ignores_lowercase_expansion() {
        // 'İ' lowercases to two chars; 30 of them must still count as 30.
        let prompt = "İ".repeat(30);
        assert_eq!(prompt.to_lowercase().chars().count(), 60);
        assert!(pattern(VAGUE_GOAL).matches(&prompt));
    }

    #[test]
    fn multi_task_counts_whole_words() {
        let p = pattern(MULTI_TASK);
        assert!(p.matches("A and B and C and D"));
        assert!(!p.matches("A and B"));
        assert!(p.matches("A AND B And C and D"));
        // "band" and "android" are not the word "and".
        assert!(!p.matches("band android candy and sand"));
    }

    #[test]
    fn multi_task_also_then_ignores_and_count() {
        let p = pattern(MULTI_TASK);
        assert!(p.matches("fetch it, also then post it"));
        assert!(!p.matches("fetch it, also post it"));
    }

    #[test]
    fn no_constraints_respects_only() {
        let p = pattern(NO_CONSTRAINTS);
        assert!(!p.matches("Only fetch the top item"));
        assert!(p.matches("Fetch everything"));
    }

    #[test]
    fn keyword_checks_ignore_case() {
        assert!(!pattern(NO_CONSTRAINTS).matches("MAX three"));
        assert!(!pattern(MISSING_CONTEXT).matches("Because reasons"));
        assert!(!pattern(UNCLEAR_FORMAT).matches("give me a Summary"));
        assert!(pattern(UNCLEAR_FORMAT).matches("give me everything"));
    }

    #[test]
    fn word_counts() {
        assert_eq!(and_count("and AND And band"), 3);
        assert_eq!(also_count("also, Also; also-ran"), 3);
    }
}
