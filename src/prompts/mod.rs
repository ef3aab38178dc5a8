//! Heuristic prompt analysis and improvement.
//!
//! - [`patterns`]: the fixed pattern library
//! - [`classifier`]: per-prompt analysis with historical success rate
//! - [`rewriter`]: template-based rewrites of a single prompt
//! - [`annotate`]: rewrites attached to every task in a collection
//! - [`report`]: success rates with vs. without each pattern
//!
//! Everything here is a pure function of its inputs. Callers pass a snapshot
//! of the task log; nothing is cached between calls.

pub mod annotate;
pub mod classifier;
pub mod patterns;
pub mod report;
pub mod rewriter;

pub use annotate::{annotate, annotate_one};
pub use classifier::{IMPROVEMENT_THRESHOLD, PromptAnalysis, analyze, analyze_all};
pub use patterns::{PATTERNS, Pattern, Severity};
pub use report::{PatternEffectiveness, compare_effectiveness};
pub use rewriter::{Rewrite, clean_prompt, rewrite};
