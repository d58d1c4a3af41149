//! Terminal display formatting
//!
//! Handles colored output for tasks, the schedule, stats and the profile.

use chrono::NaiveDate;
use colored::*;

use lockin_core::analytics::{AnalyticsReport, TrendPoint, format_duration};
use lockin_core::{
    Notice, NoticeKind, Priority, ScheduleItem, StoreObserver, Task, Theme, UserProfile,
};

/// Width of the longest bar in trend charts
const BAR_WIDTH: u32 = 30;

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn paint(text: &str, theme: Theme, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let (r, g, b) = theme.accent();
    text.truecolor(r, g, b).bold().to_string()
}

/// Format a task on one line
pub fn format_task(task: &Task, today: NaiveDate, use_color: bool) -> String {
    let checkbox = if task.is_complete() { "[✓]" } else { "[ ]" };

    let id_str = if use_color {
        format!("[{}]", task.id.short()).cyan().to_string()
    } else {
        format!("[{}]", task.id.short())
    };

    let title = if use_color && task.is_complete() {
        task.title.green().to_string()
    } else {
        task.title.clone()
    };

    let priority = match (use_color, task.priority) {
        (true, Priority::High) => task.priority.as_str().red().to_string(),
        (true, Priority::Medium) => task.priority.as_str().yellow().to_string(),
        (true, Priority::Low) => task.priority.as_str().normal().to_string(),
        (false, _) => task.priority.as_str().to_string(),
    };

    let mut line = format!(
        "{} {} {} ({} | {} | {} | {} energy)",
        checkbox,
        id_str,
        title,
        format_duration(task.duration_minutes),
        priority,
        task.category,
        task.energy_required
    );

    if let Some(deadline) = task.deadline {
        let due = format!("due {}", deadline.format("%Y-%m-%d"));
        let due = if use_color && task.is_overdue(today) {
            due.red().bold().to_string()
        } else {
            due
        };
        line.push(' ');
        line.push_str(&due);
    }

    if let Some(spent) = task.time_spent.filter(|m| *m > 0) {
        line.push_str(&format!(" [{} logged]", format_duration(spent)));
    }

    line
}

/// Format a summary line for task list
pub fn format_summary(total: usize, completed: usize, overdue: usize, use_color: bool) -> String {
    let parts = vec![
        format!("{} total", total),
        if use_color {
            format!("{} done", completed).green().to_string()
        } else {
            format!("{} done", completed)
        },
        if overdue > 0 {
            if use_color {
                format!("{} overdue", overdue).red().to_string()
            } else {
                format!("{} overdue", overdue)
            }
        } else {
            String::new()
        },
    ];

    let summary: Vec<&str> = parts.iter().filter(|s| !s.is_empty()).map(|s| s.as_str()).collect();

    format!("[{}]", summary.join(" | "))
}

/// Format a schedule slot; `index` is 1-based
pub fn format_schedule_item(index: usize, item: &ScheduleItem, done: bool, use_color: bool) -> String {
    let marker = if item.is_break {
        "~"
    } else if done {
        "✓"
    } else {
        "•"
    };

    let slot = if use_color {
        item.time_slot.cyan().to_string()
    } else {
        item.time_slot.clone()
    };

    let title = if use_color && item.is_break {
        item.title.dimmed().to_string()
    } else if use_color && done {
        item.title.green().to_string()
    } else {
        item.title.clone()
    };

    let mut line = format!("{:>2}. {} {} {} ({})", index, marker, slot, title, item.category);
    if !item.description.is_empty() {
        let description = if use_color {
            item.description.italic().to_string()
        } else {
            item.description.clone()
        };
        line.push_str(&format!("\n      {}", description));
    }
    line
}

/// Format the stats report for a range
pub fn format_report(report: &AnalyticsReport, theme: Theme, use_color: bool) -> String {
    let rows = [
        (
            "Focus time",
            format_duration(report.current.focus_minutes),
            report.change.focus_minutes,
        ),
        (
            "Tasks done",
            report.current.tasks_completed.to_string(),
            report.change.tasks_completed,
        ),
        (
            "Sessions",
            report.current.sessions.to_string(),
            report.change.sessions,
        ),
        (
            "Break time",
            format_duration(report.current.break_minutes),
            report.change.break_minutes,
        ),
    ];

    let mut lines = vec![paint(&format!("STATS: {}", report.range), theme, use_color)];
    for (label, value, change) in rows {
        lines.push(format!("  {:<11} {:>8}  {}", label, value, format_change(change, use_color)));
    }
    lines.join("\n")
}

fn format_change(change: i64, use_color: bool) -> String {
    let text = if change > 0 {
        format!("+{}%", change)
    } else {
        format!("{}%", change)
    };

    match (use_color, change.signum()) {
        (true, 1) => text.green().to_string(),
        (true, -1) => text.red().to_string(),
        _ => text,
    }
}

/// Horizontal bar chart of daily focus minutes
pub fn format_trend(points: &[TrendPoint], theme: Theme, use_color: bool) -> String {
    let max = points.iter().map(|p| p.minutes).max().unwrap_or(0).max(1);

    points
        .iter()
        .map(|p| {
            let width = (p.minutes * BAR_WIDTH).div_ceil(max) as usize;
            let bar = "█".repeat(width);
            format!(
                "  {:>6} {} {}",
                p.label,
                paint(&bar, theme, use_color),
                format_duration(p.minutes)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the profile card
pub fn format_profile(profile: &UserProfile, use_color: bool) -> String {
    let filled = (profile.level_progress() / 5) as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled.min(20)));

    let pomo = &profile.pomodoro_settings;
    [
        paint(&format!("{} // LVL {}", profile.name, profile.level()), profile.theme, use_color),
        format!(
            "  Aura: {} ({} to level {})",
            profile.aura,
            profile.next_level_at() - profile.aura,
            profile.level() + 1
        ),
        format!("  [{}] {}%", paint(&bar, profile.theme, use_color), profile.level_progress()),
        format!("  Streak: {} day(s)", profile.streak),
        format!(
            "  Day: {} - {}, peak: {}",
            profile.wake_up_time, profile.sleep_time, profile.productive_hours
        ),
        format!(
            "  Pomodoro: {}/{}/{} min, auto breaks: {}, auto focus: {}",
            pomo.work_duration,
            pomo.short_break_duration,
            pomo.long_break_duration,
            on_off(pomo.auto_start_breaks),
            on_off(pomo.auto_start_pomodoros)
        ),
        format!("  Theme: {}", profile.theme.label()),
    ]
    .join("\n")
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// Format a store notice like a toast
pub fn format_notice(notice: &Notice, use_color: bool) -> String {
    let text = format!(">> {}", notice.message);
    if !use_color {
        return text;
    }
    match notice.kind {
        NoticeKind::Success => text.green().bold().to_string(),
        NoticeKind::Info => text.cyan().to_string(),
        NoticeKind::Error => text.red().bold().to_string(),
    }
}

/// Prints store notices and remembers the active theme
pub struct ConsoleObserver {
    use_color: bool,
    theme: Theme,
}

impl ConsoleObserver {
    pub fn new(use_color: bool) -> Self {
        Self {
            use_color,
            theme: Theme::default(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }
}

impl StoreObserver for ConsoleObserver {
    fn notice(&mut self, notice: &Notice) {
        println!("{}", format_notice(notice, self.use_color));
    }

    fn theme_changed(&mut self, theme: Theme) {
        self.theme = theme;
    }
}
