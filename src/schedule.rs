//! Read-only calendar view over the cron job definitions.
//!
//! Nothing here runs jobs. Times come from the `nextRunAtMs` and
//! `lastRunAtMs` fields the scheduler writes into `cron-jobs.json`.

use crate::types::CronJob;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Scheduled,
    Completed,
    Failed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Completed => "completed",
            EventStatus::Failed => "failed",
        }
    }
}

/// One run of a job placed on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub time: DateTime<Utc>,
    pub status: EventStatus,
}

/// Render a five-field cron expression in words, or return it unchanged.
pub fn describe_cron(expr: &str) -> String {
    let parts: Vec<&str> = expr.split_whitespace().collect();
    let &[minute, hour, day_of_month, month, day_of_week] = parts.as_slice() else {
        return expr.to_string();
    };

    if minute == "0" {
        if let Some((_, interval)) = hour.split_once('/') {
            return format!("Every {} hours", interval);
        }
    }
    if minute == "0" && hour != "*" && day_of_month == "*" && month == "*" && day_of_week == "*" {
        if let Some(h) = leading_number(hour) {
            let ampm = if h >= 12 { "PM" } else { "AM" };
            let hour12 = if h % 12 == 0 { 12 } else { h % 12 };
            return format!("Daily at {}:00 {}", hour12, ampm);
        }
    }
    if day_of_week != "*" {
        return format!("Weekly on {}", day_of_week);
    }
    expr.to_string()
}

fn leading_number(field: &str) -> Option<u32> {
    let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Weekdays (0 = Sunday) a job fires on, from its day-of-week field.
pub fn job_days(job: &CronJob) -> Vec<u32> {
    let parts: Vec<&str> = job.schedule.expr.split_whitespace().collect();
    if parts.len() != 5 {
        return Vec::new();
    }
    let all = (0..7).collect();
    match parts[4] {
        "*" => all,
        dow if dow.contains(',') => dow.split(',').filter_map(leading_number).collect(),
        dow => leading_number(dow).map(|d| vec![d]).unwrap_or(all),
    }
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

/// Events for enabled jobs falling inside `[start, start + 7 days]`, by time.
pub fn events_for_week(jobs: &[CronJob], start: DateTime<Utc>) -> Vec<CalendarEvent> {
    let end = start + Duration::days(7);
    let in_range = |t: &DateTime<Utc>| *t >= start && *t <= end;
    let mut events = Vec::new();

    for job in jobs.iter().filter(|j| j.enabled) {
        if let Some(next) = job.next_run_at_ms.and_then(from_millis).filter(in_range) {
            events.push(CalendarEvent {
                id: format!("{}-next", job.id),
                title: job.name.clone(),
                time: next,
                status: EventStatus::Scheduled,
            });
        }
        if let Some(last) = job.last_run_at_ms.and_then(from_millis).filter(in_range) {
            let status = if job.last_status.as_deref() == Some("ok") {
                EventStatus::Completed
            } else {
                EventStatus::Failed
            };
            events.push(CalendarEvent {
                id: format!("{}-last", job.id),
                title: job.name.clone(),
                time: last,
                status,
            });
        }
    }

    events.sort_by_key(|e| e.time);
    events
}

/// Group events by UTC calendar date, preserving event order within a day.
pub fn group_events_by_date(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        grouped
            .entry(event.time.date_naive())
            .or_default()
            .push(event.clone());
    }
    grouped
}

/// Midnight UTC of the Sunday starting the week containing `now`.
pub fn week_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_back = now.weekday().num_days_from_sunday() as i64;
    let date = now.date_naive() - Duration::days(days_back);
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

/// Enabled jobs with a known next run, soonest first.
pub fn upcoming_jobs(jobs: &[CronJob], limit: usize) -> Vec<CronJob> {
    let mut upcoming: Vec<CronJob> = jobs
        .iter()
        .filter(|j| j.enabled && j.next_run_at_ms.is_some())
        .cloned()
        .collect();
    upcoming.sort_by_key(|j| j.next_run_at_ms);
    upcoming.truncate(limit);
    upcoming
}

/// Countdown to `next`: "Running..." once due, else the largest whole unit.
pub fn time_until(next: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = next - now;
    if diff < Duration::zero() {
        return "Running...".to_string();
    }
    let minutes = diff.num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else {
        format!("{}m", minutes)
    }
}

/// Short relative age such as "5m ago", "3h ago" or "2d ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - then;
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();
    if minutes < 60 {
        format!("{}m ago", minutes.max(0))
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else {
        then.format("%b %-d").to_string()
    }
}

/// "Mon 8:00 AM" style label for a run time.
pub fn format_run_time(time: DateTime<Utc>) -> String {
    let h = time.hour();
    let ampm = if h >= 12 { "PM" } else { "AM" };
    let hour12 = if h % 12 == 0 { 12 } else { h % 12 };
    format!(
        "{} {}:{:02} {}",
        time.format("%a"),
        hour12,
        time.minute(),
        ampm
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CronSchedule;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, day, hour, 0, 0).unwrap()
    }

    fn job(id: &str, enabled: bool, next: Option<DateTime<Utc>>, last: Option<(DateTime<Utc>, &str)>) -> CronJob {
        CronJob {
            id: id.into(),
            name: format!("Job {id}"),
            enabled,
            schedule: CronSchedule {
                kind: "cron".into(),
                expr: "0 8 * * *".into(),
                tz: "UTC".into(),
            },
            next_run_at_ms: next.map(|t| t.timestamp_millis()),
            last_run_at_ms: last.map(|(t, _)| t.timestamp_millis()),
            last_status: last.map(|(_, s)| s.to_string()),
        }
    }

    #[test]
    fn describes_common_cron_shapes() {
        assert_eq!(describe_cron("0 */4 * * *"), "Every 4 hours");
        assert_eq!(describe_cron("0 8 * * *"), "Daily at 8:00 AM");
        assert_eq!(describe_cron("0 0 * * *"), "Daily at 12:00 AM");
        assert_eq!(describe_cron("0 15 * * *"), "Daily at 3:00 PM");
        assert_eq!(describe_cron("30 9 * * 1"), "Weekly on 1");
        assert_eq!(describe_cron("30 9 * * *"), "30 9 * * *");
        assert_eq!(describe_cron("@daily"), "@daily");
    }

    #[test]
    fn job_days_from_day_of_week() {
        let mut j = job("a", true, None, None);
        assert_eq!(job_days(&j).len(), 7);
        j.schedule.expr = "0 8 * * 1,3,5".into();
        assert_eq!(job_days(&j), vec![1, 3, 5]);
        j.schedule.expr = "0 8 * * 2".into();
        assert_eq!(job_days(&j), vec![2]);
        j.schedule.expr = "bad".into();
        assert!(job_days(&j).is_empty());
    }

    #[test]
    fn week_events_filter_and_sort() {
        let start = at(2, 0);
        let jobs = vec![
            job("a", true, Some(at(4, 8)), Some((at(3, 8), "ok"))),
            job("b", true, Some(at(20, 8)), Some((at(2, 6), "error"))),
            job("c", false, Some(at(3, 9)), None),
        ];
        let events = events_for_week(&jobs, start);
        let ids: Vec<_> = events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b-last", "a-last", "a-next"]);
        assert_eq!(events[0].status, EventStatus::Failed);
        assert_eq!(events[1].status, EventStatus::Completed);
        assert_eq!(events[2].status, EventStatus::Scheduled);

        let grouped = group_events_by_date(&events);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[&at(3, 0).date_naive()][0].id, "a-last");
    }

    #[test]
    fn week_range_is_inclusive() {
        let start = at(2, 0);
        let jobs = vec![job("a", true, Some(start + Duration::days(7)), None)];
        assert_eq!(events_for_week(&jobs, start).len(), 1);
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2025-02-05 is a Wednesday.
        assert_eq!(week_start(at(5, 13)), at(2, 0));
        assert_eq!(week_start(at(2, 13)), at(2, 0));
    }

    #[test]
    fn upcoming_sorted_soonest_first() {
        let jobs = vec![
            job("late", true, Some(at(9, 0)), None),
            job("off", false, Some(at(3, 0)), None),
            job("none", true, None, None),
            job("soon", true, Some(at(4, 0)), None),
        ];
        let upcoming = upcoming_jobs(&jobs, 5);
        let ids: Vec<_> = upcoming.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "late"]);
        assert_eq!(upcoming_jobs(&jobs, 1).len(), 1);
    }

    #[test]
    fn countdown_units() {
        let now = at(2, 0);
        assert_eq!(time_until(now - Duration::minutes(1), now), "Running...");
        assert_eq!(time_until(now + Duration::minutes(45), now), "45m");
        assert_eq!(time_until(now + Duration::minutes(150), now), "2h");
        assert_eq!(time_until(now + Duration::hours(49), now), "2d");
    }

    #[test]
    fn relative_age_and_run_label() {
        let now = at(9, 12);
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now), "2d ago");
        assert_eq!(time_ago(at(1, 0), now), "Feb 1");
        assert_eq!(format_run_time(at(3, 8)), "Mon 8:00 AM");
        assert_eq!(format_run_time(at(3, 12)), "Mon 12:00 PM");
    }
}
