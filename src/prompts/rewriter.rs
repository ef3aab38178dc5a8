//! Prompt rewriter: turns a logged trigger into a concrete, fill-in-the-blanks
//! prompt instead of generic advice.
//!
//! Rules are tried in order and the first applicable one wins:
//! 1. already structured (numbered steps or long) -> unchanged
//! 2. short (< 30 chars) -> keyword template
//! 3. otherwise -> additive edits, one note per edit

use super::patterns::{also_count, and_count};
use crate::types::Outcome;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const SHORT_PROMPT_CHARS: usize = 30;
const STRUCTURED_PROMPT_CHARS: usize = 300;

pub const NOTE_ALREADY_STRUCTURED: &str = "Already well-structured with clear steps.";
pub const NOTE_GREETING: &str = "Simple greeting - no improvement needed.";
pub const NOTE_LOOKS_GOOD: &str = "Prompt looks good as-is.";

/// A rewritten prompt and a one-line rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rewrite {
    pub improved_prompt: String,
    pub notes: String,
}

impl Rewrite {
    fn new(improved_prompt: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            improved_prompt: improved_prompt.into(),
            notes: notes.into(),
        }
    }
}

/// Noise the chat bridge injects into triggers.
static NOISE: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"\[message_id: [^\]]+\]").unwrap(),
        Regex::new(r"\[iMessage [^\]]+\]").unwrap(),
        Regex::new(r"\[Queued messages[^\]]*\]").unwrap(),
        Regex::new(r"---\s*Queued #\d+").unwrap(),
    ]
});

/// Strip message-id, channel, and queue markers, then trim.
pub fn clean_prompt(prompt: &str) -> String {
    let mut cleaned = prompt.to_string();
    for re in NOISE.iter() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// Rewrite `prompt` given the tools its task used.
pub fn rewrite(prompt: &str, tools: &[String], _outcome: Outcome) -> Rewrite {
    // Outcome does not currently change the rewrite.
    let cleaned = clean_prompt(prompt);
    let len = cleaned.chars().count();

    if (cleaned.contains("1.") && cleaned.contains("2.")) || len > STRUCTURED_PROMPT_CHARS {
        return Rewrite::new(cleaned, NOTE_ALREADY_STRUCTURED);
    }

    if len < SHORT_PROMPT_CHARS {
        return expand_short(&cleaned);
    }

    structure(&cleaned, tools)
}

/// A keyword-triggered template for short prompts.
struct ShortRule {
    keywords: &'static [&'static str],
    expand: fn(&str) -> Rewrite,
}

// Checked in order; a prompt can hit several keyword sets.
static SHORT_RULES: [ShortRule; 4] = [
    ShortRule {
        keywords: &["are you there", "hello", "hi"],
        expand: greeting,
    },
    ShortRule {
        keywords: &["check", "status"],
        expand: status_check,
    },
    ShortRule {
        keywords: &["fix", "debug"],
        expand: debugging,
    },
    ShortRule {
        keywords: &["build", "create", "make"],
        expand: build,
    },
];

fn expand_short(prompt: &str) -> Rewrite {
    let lower = prompt.to_lowercase();
    SHORT_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lower.contains(k)))
        .map(|rule| (rule.expand)(prompt))
        .unwrap_or_else(|| generic(prompt))
}

fn greeting(prompt: &str) -> Rewrite {
    Rewrite::new(prompt, NOTE_GREETING)
}

fn status_check(_prompt: &str) -> Rewrite {
    Rewrite::new(
        "Check the status of [SPECIFIC THING] and report:\n\
         - Current state\n\
         - Any issues or blockers\n\
         - Recommended next actions",
        "Added specificity and structured output format.",
    )
}

fn debugging(_prompt: &str) -> Rewrite {
    Rewrite::new(
        "Debug and fix [SPECIFIC ISSUE]:\n\
         \n\
         Context: [What you were doing when it broke]\n\
         Error: [Exact error message or behavior]\n\
         Expected: [What should happen instead]\n\
         \n\
         After fixing, verify the fix works.",
        "Added debugging context template for faster resolution.",
    )
}

fn build(_prompt: &str) -> Rewrite {
    Rewrite::new(
        "Build [SPECIFIC THING]:\n\
         \n\
         Requirements:\n\
         - [Key requirement 1]\n\
         - [Key requirement 2]\n\
         \n\
         Tech: [Preferred stack if any]\n\
         Output: [Where to put it, how to run it]",
        "Added requirements and output specification.",
    )
}

fn generic(prompt: &str) -> Rewrite {
    Rewrite::new(
        format!(
            "{}\n\n\
             Specifics:\n\
             - [Add what exactly you need]\n\
             - [Add any constraints]\n\
             - [Add expected output format]",
            prompt
        ),
        "Short prompt - added structure for clarity. Fill in the specifics.",
    )
}

fn lacks_all(text: &str, needles: &[&str]) -> bool {
    !needles.iter().any(|n| text.contains(n))
}

fn structure(prompt: &str, tools: &[String]) -> Rewrite {
    let lower = prompt.to_lowercase();
    let uses = |name: &str| tools.iter().any(|t| t == name);
    let mut improved = prompt.to_string();
    let mut notes: Vec<&str> = Vec::new();

    if lacks_all(&lower, &["when done", "success", "complete", "verify"]) {
        improved.push_str("\n\nWhen done: [Describe what \"done\" looks like]");
        notes.push("Added success criteria placeholder");
    }

    if and_count(prompt) + also_count(prompt) > 2 {
        notes.push("Consider splitting into separate tasks for better focus");
    }

    if (uses("web_search") || uses("web_fetch"))
        && lacks_all(&lower, &["list", "summary", "table", "format"])
    {
        improved.push_str("\n\nFormat: [bullet list / table / summary paragraph]");
        notes.push("Added output format for research tasks");
    }

    if !lacks_all(&lower, &["find", "search", "research"])
        && lacks_all(&lower, &["limit", "top", "max", "only"])
    {
        improved.push_str("\n\nLimit: Top 5 results only");
        notes.push("Added result limit to prevent scope creep");
    }

    if (uses("write") || uses("edit")) && lacks_all(&lower, &["file", "path", "in "]) {
        notes.push("Consider specifying target file/directory");
    }

    let notes = if notes.is_empty() {
        NOTE_LOOKS_GOOD.to_string()
    } else {
        format!("{}.", notes.join(". "))
    };

    Rewrite::new(improved, notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn greeting_is_left_alone() {
        let r = rewrite("hi", &[], Outcome::Success);
        assert_eq!(r.improved_prompt, "hi");
        assert_eq!(r.notes, "Simple greeting - no improvement needed.");

        let r = rewrite("Are you there?", &[], Outcome::Success);
        assert_eq!(r.improved_prompt, "Are you there?");
        assert_eq!(r.notes, NOTE_GREETING);
    }

    #[test]
    fn status_check_template() {
        let r = rewrite("check the server", &[], Outcome::Failed);
        assert!(r.improved_prompt.starts_with("Check the status of [SPECIFIC THING]"));
        assert!(r.improved_prompt.contains("- Recommended next actions"));
        assert_eq!(r.notes, "Added specificity and structured output format.");
    }

    #[test]
    fn debugging_template() {
        let r = rewrite("fix", &[], Outcome::Failed);
        assert!(r.improved_prompt.contains("Context:"));
        assert!(r.improved_prompt.contains("Error:"));
        assert!(r.improved_prompt.contains("Expected:"));
        assert_eq!(
            r.notes,
            "Added debugging context template for faster resolution."
        );
    }

    #[test]
    fn build_template() {
        let r = rewrite("make a todo app", &[], Outcome::Success);
        assert!(r.improved_prompt.starts_with("Build [SPECIFIC THING]:"));
        assert!(r.improved_prompt.contains("Requirements:"));
        assert_eq!(r.notes, "Added requirements and output specification.");
    }

    #[test]
    fn first_keyword_rule_wins() {
        // "status" and "fix" both present; status-check comes first.
        let r = rewrite("fix status page", &[], Outcome::Failed);
        assert_eq!(r.notes, "Added specificity and structured output format.");
    }

    #[test]
    fn greeting_keyword_is_a_plain_substring() {
        // "this" contains "hi".
        let r = rewrite("fix this", &[], Outcome::Failed);
        assert_eq!(r.notes, NOTE_GREETING);
        assert_eq!(r.improved_prompt, "fix this");
    }

    #[test]
    fn generic_short_expansion() {
        let r = rewrite("weather", &[], Outcome::Success);
        assert!(r.improved_prompt.starts_with("weather\n\nSpecifics:\n"));
        assert!(r.improved_prompt.ends_with("- [Add expected output format]"));
        assert_eq!(
            r.notes,
            "Short prompt - added structure for clarity. Fill in the specifics."
        );
    }

    #[test]
    fn numbered_steps_are_kept() {
        let prompt = "Do this:\n1. fetch data\n2. summarize it";
        let r = rewrite(prompt, &tools(&["web_fetch"]), Outcome::Partial);
        assert_eq!(r.improved_prompt, prompt);
        assert_eq!(r.notes, NOTE_ALREADY_STRUCTURED);
    }

    #[test]
    fn long_prompts_are_kept() {
        let prompt = format!("  {}  ", "word ".repeat(70));
        let r = rewrite(&prompt, &[], Outcome::Success);
        assert_eq!(r.improved_prompt, prompt.trim());
        assert_eq!(r.notes, NOTE_ALREADY_STRUCTURED);
    }

    #[test]
    fn structured_output_is_stable() {
        let prompt = "Steps:\n1. one\n2. two";
        let first = rewrite(prompt, &[], Outcome::Success);
        let second = rewrite(&first.improved_prompt, &[], Outcome::Success);
        assert_eq!(first, second);
    }

    #[test]
    fn cleanup_strips_noise_markers() {
        let raw = "[Queued messages while agent was busy]\n--- Queued #1\n[iMessage +15551234567 2025-01-30 08:00] hello there [message_id: 4F2A]";
        assert_eq!(clean_prompt(raw), "hello there");
    }

    #[test]
    fn length_checks_use_cleaned_text() {
        // Raw text is long, but cleaned text is a short greeting.
        let raw = format!("[message_id: {}] hello", "x".repeat(400));
        let r = rewrite(&raw, &[], Outcome::Success);
        assert_eq!(r.improved_prompt, "hello");
        assert_eq!(r.notes, NOTE_GREETING);
    }

    #[test]
    fn medium_prompt_gets_success_criteria() {
        let prompt = "Summarize yesterday's calendar events for me";
        let r = rewrite(prompt, &[], Outcome::Success);
        assert_eq!(
            r.improved_prompt,
            format!("{}\n\nWhen done: [Describe what \"done\" looks like]", prompt)
        );
        assert_eq!(r.notes, "Added success criteria placeholder.");
    }

    #[test]
    fn medium_prompt_looks_good() {
        let prompt = "Verify the nightly backup in the logs folder";
        let r = rewrite(prompt, &[], Outcome::Success);
        assert_eq!(r.improved_prompt, prompt);
        assert_eq!(r.notes, NOTE_LOOKS_GOOD);
    }

    #[test]
    fn research_prompt_gets_format_and_limit() {
        let prompt = "Research new Rust web frameworks released recently";
        let r = rewrite(prompt, &tools(&["web_search"]), Outcome::Success);
        assert_eq!(
            r.improved_prompt,
            format!(
                "{}\n\nWhen done: [Describe what \"done\" looks like]\
                 \n\nFormat: [bullet list / table / summary paragraph]\
                 \n\nLimit: Top 5 results only",
                prompt
            )
        );
        assert_eq!(
            r.notes,
            "Added success criteria placeholder. \
             Added output format for research tasks. \
             Added result limit to prevent scope creep."
        );
    }

    #[test]
    fn bundled_tasks_only_add_a_note() {
        let prompt = "Verify the build and run tests and also deploy and notify me";
        let r = rewrite(prompt, &[], Outcome::Success);
        assert_eq!(r.improved_prompt, prompt);
        assert_eq!(
            r.notes,
            "Consider splitting into separate tasks for better focus."
        );
    }

    #[test]
    fn write_tools_without_target_add_a_note() {
        let prompt = "Verify that the new greeting copy reads well";
        let r = rewrite(prompt, &tools(&["edit"]), Outcome::Success);
        assert_eq!(r.improved_prompt, prompt);
        assert_eq!(r.notes, "Consider specifying target file/directory.");

        let prompt = "Verify the greeting copy in the README file";
        let r = rewrite(prompt, &tools(&["write"]), Outcome::Success);
        assert_eq!(r.notes, NOTE_LOOKS_GOOD);
    }

    #[test]
    fn rewrite_is_deterministic() {
        let prompt = "Find cheap flights to Lisbon for the spring trip";
        let t = tools(&["web_fetch"]);
        assert_eq!(
            rewrite(prompt, &t, Outcome::Failed),
            rewrite(prompt, &t, Outcome::Failed)
        );
    }
}
