//! Session health scoring: signals that a long-running conversation has
//! gone stale and should be restarted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MAX_TURNS: u32 = 50;
const MAX_AGE_MS: i64 = 4 * 60 * 60 * 1000;
const MAX_CLARIFICATIONS: u32 = 3;
const MAX_FAILURES: u32 = 2;
const MAX_REPETITIONS: u32 = 2;

/// Raw counters for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMetrics {
    pub session_key: String,
    pub start_time: DateTime<Utc>,
    pub turn_count: u32,
    pub clarification_requests: u32,
    pub task_failures: u32,
    pub repetitions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Length,
    Clarification,
    Failure,
    Repetition,
    Age,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSignal {
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub severity: SignalSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    Continue,
    ConsiderNew,
    StartNew,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Continue => "continue",
            Recommendation::ConsiderNew => "consider-new",
            Recommendation::StartNew => "start-new",
        }
    }
}

/// Scored health of a session, as stored in `sessions.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHealth {
    pub session_key: String,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub turn_count: u32,
    pub clarification_requests: u32,
    pub task_failures: u32,
    pub repetitions: u32,
    /// 0-100.
    pub health_score: u32,
    pub recommendation: Recommendation,
    pub signals: Vec<HealthSignal>,
}

/// Score a session as of `now`.
pub fn calculate_session_health(metrics: &SessionMetrics, now: DateTime<Utc>) -> SessionHealth {
    let mut signals = Vec::new();
    let mut score: i32 = 100;
    let age = now - metrics.start_time;

    if metrics.turn_count > MAX_TURNS {
        let high = metrics.turn_count as f64 > MAX_TURNS as f64 * 1.5;
        signals.push(HealthSignal {
            kind: SignalType::Length,
            severity: if high {
                SignalSeverity::High
            } else {
                SignalSeverity::Medium
            },
            message: format!(
                "{} turns - conversation is getting long",
                metrics.turn_count
            ),
        });
        score -= if high { 25 } else { 15 };
    }

    if age > Duration::milliseconds(MAX_AGE_MS) {
        let high = age > Duration::milliseconds(MAX_AGE_MS * 2);
        let hours = (age.num_milliseconds() as f64 / 3_600_000.0).round() as i64;
        signals.push(HealthSignal {
            kind: SignalType::Age,
            severity: if high {
                SignalSeverity::High
            } else {
                SignalSeverity::Medium
            },
            message: format!("Session is {}h old - context may be stale", hours),
        });
        score -= if high { 20 } else { 10 };
    }

    if metrics.clarification_requests > MAX_CLARIFICATIONS {
        signals.push(HealthSignal {
            kind: SignalType::Clarification,
            severity: SignalSeverity::High,
            message: format!(
                "{} clarifications needed - possible context confusion",
                metrics.clarification_requests
            ),
        });
        score -= 20;
    }

    if metrics.task_failures > MAX_FAILURES {
        signals.push(HealthSignal {
            kind: SignalType::Failure,
            severity: SignalSeverity::High,
            message: format!(
                "{} task failures - something may be off",
                metrics.task_failures
            ),
        });
        score -= 25;
    }

    if metrics.repetitions > MAX_REPETITIONS {
        signals.push(HealthSignal {
            kind: SignalType::Repetition,
            severity: SignalSeverity::Medium,
            message: format!(
                "Repeating information {} times - context may be degrading",
                metrics.repetitions
            ),
        });
        score -= 15;
    }

    let health_score = score.clamp(0, 100) as u32;

    SessionHealth {
        session_key: metrics.session_key.clone(),
        start_time: metrics.start_time,
        last_activity: now,
        turn_count: metrics.turn_count,
        clarification_requests: metrics.clarification_requests,
        task_failures: metrics.task_failures,
        repetitions: metrics.repetitions,
        health_score,
        recommendation: recommend(health_score),
        signals,
    }
}

fn recommend(score: u32) -> Recommendation {
    if score >= 70 {
        Recommendation::Continue
    } else if score >= 40 {
        Recommendation::ConsiderNew
    } else {
        Recommendation::StartNew
    }
}

/// Three-band label for a score, used as a CSS class by the dashboard.
pub fn health_label(score: u32) -> &'static str {
    if score >= 70 {
        "good"
    } else if score >= 40 {
        "fair"
    } else {
        "poor"
    }
}
