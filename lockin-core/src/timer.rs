//! Focus and Pomodoro timer state
//!
//! These types only count ticks; the caller drives them from a clock.

use std::fmt;

use crate::profile::PomodoroSettings;

/// Work phases completed before a long break is due
pub const LONG_BREAK_EVERY: u32 = 4;

/// Default length of a focus session in minutes
pub const FOCUS_SESSION_MINUTES: u32 = 25;

/// Phase of a Pomodoro cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Work => "Focus",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happens after a phase ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub finished: Phase,
    pub next: Phase,
    /// Whether the next phase should start without user input
    pub auto_start: bool,
}

/// Pomodoro cycle bookkeeping
#[derive(Debug, Clone)]
pub struct PomodoroCycle {
    settings: PomodoroSettings,
    phase: Phase,
    completed_work: u32,
}

impl PomodoroCycle {
    pub fn new(settings: PomodoroSettings) -> Self {
        Self {
            settings,
            phase: Phase::Work,
            completed_work: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of work phases finished so far
    pub fn completed_work(&self) -> u32 {
        self.completed_work
    }

    pub fn phase_minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.settings.work_duration,
            Phase::ShortBreak => self.settings.short_break_duration,
            Phase::LongBreak => self.settings.long_break_duration,
        }
    }

    pub fn current_minutes(&self) -> u32 {
        self.phase_minutes(self.phase)
    }

    /// End the current phase and move to the next one
    pub fn advance(&mut self) -> Transition {
        let finished = self.phase;
        let (next, auto_start) = match finished {
            Phase::Work => {
                self.completed_work += 1;
                let next = if self.completed_work % LONG_BREAK_EVERY == 0 {
                    Phase::LongBreak
                } else {
                    Phase::ShortBreak
                };
                (next, self.settings.auto_start_breaks)
            }
            Phase::ShortBreak | Phase::LongBreak => (Phase::Work, self.settings.auto_start_pomodoros),
        };
        self.phase = next;
        Transition {
            finished,
            next,
            auto_start,
        }
    }
}

/// Countdown that keeps counting elapsed time after reaching zero
#[derive(Debug, Clone)]
pub struct Countdown {
    target_secs: u64,
    elapsed_secs: u64,
}

impl Countdown {
    pub fn from_minutes(minutes: u32) -> Self {
        Self {
            target_secs: u64::from(minutes) * 60,
            elapsed_secs: 0,
        }
    }

    /// Advance by one second
    pub fn tick(&mut self) {
        self.elapsed_secs += 1;
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.target_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_secs >= self.target_secs
    }

    /// Whole minutes spent so far
    pub fn minutes_spent(&self) -> u32 {
        (self.elapsed_secs / 60) as u32
    }

    /// Share of the target already elapsed, 0-100
    pub fn progress_percent(&self) -> u32 {
        if self.target_secs == 0 {
            return 100;
        }
        (self.elapsed_secs.min(self.target_secs) * 100 / self.target_secs) as u32
    }
}

/// How a focus session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// The user finished the task; minutes spent
    Completed(u32),
    /// The user left early; minutes spent
    Abandoned(u32),
}

impl FocusOutcome {
    pub fn minutes(&self) -> u32 {
        match self {
            FocusOutcome::Completed(m) | FocusOutcome::Abandoned(m) => *m,
        }
    }
}

/// Format seconds as MM:SS
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
