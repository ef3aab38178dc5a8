//! Agent Dashboard Library
//!
//! Prompt pattern analysis, session health scoring and the web dashboard
//! over an agent's JSON Lines activity log.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod health;
pub mod logging;
pub mod projects;
pub mod prompts;
pub mod schedule;
pub mod stats;
pub mod store;
pub mod types;
