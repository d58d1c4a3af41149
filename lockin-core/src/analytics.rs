//! Analytics aggregation over completed tasks
//!
//! Statistics are computed for a time window ending at `now` and compared
//! against the window of equal length immediately before it.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::task::Task;

/// Share of focus time credited as break time
const BREAK_RATIO: f64 = 0.2;

/// Reporting range for stats
///
/// The rolling ranges are fixed spans of 7x24 and 28x24 hours back from
/// `now`, not calendar days, so across a daylight saving change the window
/// start sits one hour off local midnight-aligned arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Today,
    #[default]
    Week,
    FourWeeks,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Today, TimeRange::Week, TimeRange::FourWeeks];

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Today => "Today",
            TimeRange::Week => "1 Week",
            TimeRange::FourWeeks => "4 Weeks",
        }
    }

    /// Length of the rolling window, None for the calendar-day range
    fn window(&self) -> Option<Duration> {
        match self {
            TimeRange::Today => None,
            TimeRange::Week => Some(Duration::days(7)),
            TimeRange::FourWeeks => Some(Duration::days(28)),
        }
    }

    /// Number of points in the daily trend series
    pub fn trend_days(&self) -> u32 {
        match self {
            TimeRange::Today | TimeRange::Week => 7,
            TimeRange::FourWeeks => 28,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "day" | "1d" => Ok(TimeRange::Today),
            "week" | "1w" | "1 week" | "7d" => Ok(TimeRange::Week),
            "month" | "4w" | "4 weeks" | "28d" => Ok(TimeRange::FourWeeks),
            other => Err(CoreError::parse(format!(
                "Unknown range '{}', expected today, week or month",
                other
            ))),
        }
    }
}

/// Totals for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowStats {
    pub focus_minutes: u32,
    pub tasks_completed: u32,
    pub sessions: u32,
    pub break_minutes: u32,
}

impl WindowStats {
    fn add(&mut self, task: &Task) {
        self.focus_minutes = self.focus_minutes.saturating_add(task.focus_minutes());
        self.tasks_completed += 1;
        self.sessions += 1;
    }

    fn finish(mut self) -> Self {
        self.break_minutes = (f64::from(self.focus_minutes) * BREAK_RATIO).floor() as u32;
        self
    }
}

/// Percent change per metric, current against previous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsChange {
    pub focus_minutes: i64,
    pub tasks_completed: i64,
    pub sessions: i64,
    pub break_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsReport {
    pub range: TimeRange,
    pub current: WindowStats,
    pub previous: WindowStats,
    pub change: StatsChange,
}

/// One day of the trend series
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Short label such as "Oct 19"
    pub label: String,
    pub minutes: u32,
    pub tasks: u32,
}

/// Completed tasks with their completion time
fn completions(tasks: &[Task]) -> impl Iterator<Item = (&Task, DateTime<Utc>)> {
    tasks
        .iter()
        .filter(|t| t.is_complete())
        .filter_map(|t| t.completed_at().map(|at| (t, at)))
}

/// Compute current and previous window statistics for a range
///
/// Calendar days are taken in the time zone of `now`.
pub fn summarize<Tz: TimeZone>(tasks: &[Task], range: TimeRange, now: &DateTime<Tz>) -> AnalyticsReport {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let mut current = WindowStats::default();
    let mut previous = WindowStats::default();

    for (task, at) in completions(tasks) {
        let (in_current, in_previous) = match range.window() {
            None => {
                let day = at.with_timezone(&tz).date_naive();
                (day == today, today.pred_opt() == Some(day))
            }
            Some(window) => {
                let start = now_utc - window;
                let previous_start = start - window;
                (
                    at >= start && at <= now_utc,
                    at >= previous_start && at < start,
                )
            }
        };

        if in_current {
            current.add(task);
        } else if in_previous {
            previous.add(task);
        }
    }

    let current = current.finish();
    let previous = previous.finish();

    AnalyticsReport {
        range,
        current,
        previous,
        change: StatsChange {
            focus_minutes: percent_change(current.focus_minutes, previous.focus_minutes),
            tasks_completed: percent_change(current.tasks_completed, previous.tasks_completed),
            sessions: percent_change(current.sessions, previous.sessions),
            break_minutes: percent_change(current.break_minutes, previous.break_minutes),
        },
    }
}

/// Per-day focus minutes and completions, oldest day first
pub fn daily_trend<Tz: TimeZone>(tasks: &[Task], range: TimeRange, now: &DateTime<Tz>) -> Vec<TrendPoint> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut points: Vec<TrendPoint> = (0..range.trend_days())
        .rev()
        .map(|back| {
            let date = today - Duration::days(i64::from(back));
            TrendPoint {
                date,
                label: date.format("%b %-d").to_string(),
                minutes: 0,
                tasks: 0,
            }
        })
        .collect();

    for (task, at) in completions(tasks) {
        let day = at.with_timezone(&tz).date_naive();
        if let Some(point) = points.iter_mut().find(|p| p.date == day) {
            point.minutes = point.minutes.saturating_add(task.focus_minutes());
            point.tasks += 1;
        }
    }

    points
}

/// Percent change from `previous` to `current`, rounded half away from zero
pub fn percent_change(current: u32, previous: u32) -> i64 {
    match (current, previous) {
        (0, 0) => 0,
        (_, 0) => 100,
        _ => {
            let delta = f64::from(current) - f64::from(previous);
            (delta / f64::from(previous) * 100.0).round() as i64
        }
    }
}

/// Format minutes as "45m" or "1h 5m"
pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours == 0 {
        format!("{}m", rest)
    } else {
        format!("{}h {}m", hours, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::FixedOffset;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn done(minutes: u32, at: DateTime<Utc>) -> Task {
        Task::from_draft(TaskDraft::new("done").with_duration(minutes)).with_completed_at(at)
    }

    #[test]
    fn test_empty_collection() {
        for range in TimeRange::ALL {
            let report = summarize(&[], range, &now());
            assert_eq!(report.current, WindowStats::default());
            assert_eq!(report.previous, WindowStats::default());
            assert_eq!(report.change, StatsChange::default());
        }
    }

    #[test]
    fn test_open_tasks_are_ignored() {
        let open = Task::from_draft(TaskDraft::new("open").with_duration(90));
        let report = summarize(&[open], TimeRange::Week, &now());
        assert_eq!(report.current.tasks_completed, 0);
    }

    #[test]
    fn test_time_spent_preferred_over_estimate() {
        let logged = done(60, now() - Duration::hours(1)).with_time_spent(Some(25));
        let unlogged = done(60, now() - Duration::hours(2)).with_time_spent(Some(0));

        let report = summarize(&[logged, unlogged], TimeRange::Week, &now());
        assert_eq!(report.current.focus_minutes, 85);
        assert_eq!(report.current.break_minutes, 17);
        assert_eq!(report.current.sessions, 2);
    }

    #[test]
    fn test_week_boundary() {
        let edge = done(30, now() - Duration::days(7));
        let before_edge = done(40, now() - Duration::days(7) - Duration::seconds(1));
        let too_old = done(50, now() - Duration::days(14) - Duration::seconds(1));

        let report = summarize(&[edge, before_edge, too_old], TimeRange::Week, &now());
        assert_eq!(report.current.focus_minutes, 30);
        assert_eq!(report.previous.focus_minutes, 40);
        assert_eq!(report.change.focus_minutes, -25);
    }

    #[test]
    fn test_four_week_boundary() {
        let tasks = vec![
            done(20, now() - Duration::days(3)),
            done(30, now() - Duration::days(28)),
            done(40, now() - Duration::days(28) - Duration::seconds(1)),
            done(60, now() - Duration::days(56)),
            done(99, now() - Duration::days(56) - Duration::seconds(1)),
        ];

        let report = summarize(&tasks, TimeRange::FourWeeks, &now());
        assert_eq!(report.current.focus_minutes, 50);
        assert_eq!(report.current.tasks_completed, 2);
        assert_eq!(report.previous.focus_minutes, 100);
        assert_eq!(report.previous.tasks_completed, 2);
        assert_eq!(report.change.focus_minutes, -50);
        assert_eq!(report.change.tasks_completed, 0);
    }

    #[test]
    fn test_today_prefers_time_spent() {
        let logged = done(30, now() - Duration::hours(1)).with_time_spent(Some(45));

        let report = summarize(&[logged], TimeRange::Today, &now());
        assert_eq!(report.current.focus_minutes, 45);
        assert_eq!(report.current.break_minutes, 9);
        assert_eq!(report.current.tasks_completed, 1);
        assert_eq!(report.change.focus_minutes, 100);
    }

    #[test]
    fn test_today_uses_calendar_days_of_now() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_now = offset.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap();

        // 22:30 UTC on the 18th is 00:30 local on the 19th
        let today = done(20, Utc.with_ymd_and_hms(2026, 10, 18, 22, 30, 0).unwrap());
        let yesterday = done(10, Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap());

        let report = summarize(&[today, yesterday], TimeRange::Today, &local_now);
        assert_eq!(report.current.focus_minutes, 20);
        assert_eq!(report.previous.focus_minutes, 10);
        assert_eq!(report.change.focus_minutes, 100);
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(0, 0), 0);
        assert_eq!(percent_change(10, 0), 100);
        assert_eq!(percent_change(10, 10), 0);
        assert_eq!(percent_change(15, 10), 50);
        assert_eq!(percent_change(5, 10), -50);
        assert_eq!(percent_change(1, 3), -67);
        assert_eq!(percent_change(9, 8), 13);
        assert_eq!(percent_change(7, 8), -13);
        assert_eq!(percent_change(0, 4), -100);
    }

    #[test]
    fn test_daily_trend() {
        let tasks = vec![
            done(30, now() - Duration::hours(1)),
            done(15, now() - Duration::hours(2)),
            done(45, now() - Duration::days(6)),
            done(99, now() - Duration::days(10)),
        ];

        let points = daily_trend(&tasks, TimeRange::Week, &now());
        assert_eq!(points.len(), 7);
        assert_eq!(points[6].label, "Oct 19");
        assert_eq!(points[6].minutes, 45);
        assert_eq!(points[6].tasks, 2);
        assert_eq!(points[0].label, "Oct 13");
        assert_eq!(points[0].minutes, 45);

        let total: u32 = points.iter().map(|p| p.minutes).sum();
        assert_eq!(total, 90);

        assert_eq!(daily_trend(&tasks, TimeRange::FourWeeks, &now()).len(), 28);
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!("today".parse::<TimeRange>().unwrap(), TimeRange::Today);
        assert_eq!("1 Week".parse::<TimeRange>().unwrap(), TimeRange::Week);
        assert_eq!("month".parse::<TimeRange>().unwrap(), TimeRange::FourWeeks);
        assert!("year".parse::<TimeRange>().is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(65), "1h 5m");
        assert_eq!(format_duration(120), "2h 0m");
    }
}
