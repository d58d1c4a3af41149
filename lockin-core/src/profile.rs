//! User profile, progression and preferences

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Aura granted for completing a task (and taken back when reopening it)
pub const AURA_PER_TASK: u32 = 100;
/// Aura needed per level
pub const AURA_PER_LEVEL: u32 = 1000;

/// Colour palette for the front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Cyber,
    Y2k,
    Brat,
    Cozy,
    Drift,
    Vapor,
    Acid,
    Goth,
    Cloud,
    Retro,
    Glitch,
    Luxe,
    Void,
    Sunset,
    Mint,
}

impl Theme {
    pub const ALL: [Theme; 15] = [
        Theme::Cyber,
        Theme::Y2k,
        Theme::Brat,
        Theme::Cozy,
        Theme::Drift,
        Theme::Vapor,
        Theme::Acid,
        Theme::Goth,
        Theme::Cloud,
        Theme::Retro,
        Theme::Glitch,
        Theme::Luxe,
        Theme::Void,
        Theme::Sunset,
        Theme::Mint,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Theme::Cyber => "cyber",
            Theme::Y2k => "y2k",
            Theme::Brat => "brat",
            Theme::Cozy => "cozy",
            Theme::Drift => "drift",
            Theme::Vapor => "vapor",
            Theme::Acid => "acid",
            Theme::Goth => "goth",
            Theme::Cloud => "cloud",
            Theme::Retro => "retro",
            Theme::Glitch => "glitch",
            Theme::Luxe => "luxe",
            Theme::Void => "void",
            Theme::Sunset => "sunset",
            Theme::Mint => "mint",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Cyber => "Cyber Arcade",
            Theme::Y2k => "Y2K Matrix",
            Theme::Brat => "Brat Summer",
            Theme::Cozy => "Lo-Fi Chill",
            Theme::Drift => "Night Drift",
            Theme::Vapor => "Vaporwave",
            Theme::Acid => "Acid Pixie",
            Theme::Goth => "Whimsigoth",
            Theme::Cloud => "Cloud Dream",
            Theme::Retro => "Retro 90s",
            Theme::Glitch => "Glitchcore",
            Theme::Luxe => "Old Money",
            Theme::Void => "Pure Void",
            Theme::Sunset => "Golden Hour",
            Theme::Mint => "Mint Fresh",
        }
    }

    /// Accent colour as RGB
    pub fn accent(&self) -> (u8, u8, u8) {
        match self {
            Theme::Cyber => (0x8b, 0x5c, 0xf6),
            Theme::Y2k => (0x22, 0xc5, 0x5e),
            Theme::Brat => (0x84, 0xcc, 0x16),
            Theme::Cozy => (0xfd, 0xba, 0x74),
            Theme::Drift => (0xf4, 0x3f, 0x5e),
            Theme::Vapor => (0x00, 0xf0, 0xff),
            Theme::Acid => (0xcc, 0xff, 0x00),
            Theme::Goth => (0x9d, 0x4e, 0xdd),
            Theme::Cloud => (0xc0, 0x84, 0xfc),
            Theme::Retro => (0xf5, 0x9e, 0x0b),
            Theme::Glitch => (0xff, 0x00, 0x3c),
            Theme::Luxe => (0xd4, 0xaf, 0x37),
            Theme::Void => (0xff, 0xff, 0xff),
            Theme::Sunset => (0xf9, 0x73, 0x16),
            Theme::Mint => (0x34, 0xd3, 0x99),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Theme {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|t| t.id() == wanted || t.label().to_lowercase() == wanted)
            .ok_or_else(|| CoreError::parse(format!("Unknown theme '{}'", s.trim())))
    }
}

/// Pomodoro timer configuration, durations in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub auto_start_breaks: bool,
    pub auto_start_pomodoros: bool,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        }
    }
}

/// What a login did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Already counted today
    Unchanged,
    /// Came back the next day
    Extended,
    /// Missed at least one day, streak starts over
    Reset,
}

/// Durable per-user settings and progress
///
/// Missing fields in stored JSON fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub wake_up_time: String,
    pub sleep_time: String,
    /// Coarse label such as "morning" or "night"
    pub productive_hours: String,
    pub aura: u32,
    pub pomodoro_settings: PomodoroSettings,
    pub theme: Theme,
    pub streak: u32,
    pub last_login_date: NaiveDate,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".to_string(),
            wake_up_time: "07:00".to_string(),
            sleep_time: "23:00".to_string(),
            productive_hours: "morning".to_string(),
            aura: 0,
            pomodoro_settings: PomodoroSettings::default(),
            theme: Theme::default(),
            streak: 0,
            last_login_date: Local::now().date_naive(),
        }
    }
}

impl UserProfile {
    /// Level derived from aura, starting at 1
    pub fn level(&self) -> u32 {
        self.aura / AURA_PER_LEVEL + 1
    }

    /// Percent of the way to the next level
    pub fn level_progress(&self) -> u32 {
        (self.aura % AURA_PER_LEVEL) / 10
    }

    /// Aura total at which the next level starts
    pub fn next_level_at(&self) -> u32 {
        self.level() * AURA_PER_LEVEL
    }

    /// Add or remove aura, never going below zero
    pub fn adjust_aura(&mut self, delta: i64) {
        let next = (self.aura as i64 + delta).clamp(0, u32::MAX as i64);
        self.aura = next as u32;
    }

    /// Record a visit on `today` and update the streak
    ///
    /// Same day: unchanged. Next day: +1. Any other gap: back to 1.
    pub fn register_login(&mut self, today: NaiveDate) -> StreakChange {
        let gap = today.signed_duration_since(self.last_login_date).num_days();
        let change = match gap {
            0 => StreakChange::Unchanged,
            1 => {
                self.streak = self.streak.saturating_add(1);
                StreakChange::Extended
            }
            _ => {
                self.streak = 1;
                StreakChange::Reset
            }
        };
        self.last_login_date = today;
        change
    }
}

/// Partial profile change; only `Some` fields are applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub wake_up_time: Option<String>,
    pub sleep_time: Option<String>,
    pub productive_hours: Option<String>,
    pub aura: Option<u32>,
    pub pomodoro_settings: Option<PomodoroSettings>,
    pub theme: Option<Theme>,
    pub streak: Option<u32>,
    pub last_login_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn wake_up_time(mut self, time: impl Into<String>) -> Self {
        self.wake_up_time = Some(time.into());
        self
    }

    pub fn sleep_time(mut self, time: impl Into<String>) -> Self {
        self.sleep_time = Some(time.into());
        self
    }

    pub fn productive_hours(mut self, label: impl Into<String>) -> Self {
        self.productive_hours = Some(label.into());
        self
    }

    pub fn pomodoro(mut self, settings: PomodoroSettings) -> Self {
        self.pomodoro_settings = Some(settings);
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check clock fields are valid HH:MM and timer phases last at least a minute
    pub fn validate(&self) -> Result<()> {
        if let Some(time) = &self.wake_up_time {
            parse_clock(time)?;
        }
        if let Some(time) = &self.sleep_time {
            parse_clock(time)?;
        }
        if let Some(settings) = &self.pomodoro_settings {
            let phases = [
                ("work_duration", settings.work_duration),
                ("short_break_duration", settings.short_break_duration),
                ("long_break_duration", settings.long_break_duration),
            ];
            if let Some((field, _)) = phases.iter().find(|(_, minutes)| *minutes == 0) {
                return Err(CoreError::validation(*field, "must be at least 1 minute"));
            }
        }
        Ok(())
    }

    /// Merge into the profile, returns the new theme when it changed
    pub fn apply(self, profile: &mut UserProfile) -> Option<Theme> {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(time) = self.wake_up_time {
            profile.wake_up_time = time;
        }
        if let Some(time) = self.sleep_time {
            profile.sleep_time = time;
        }
        if let Some(label) = self.productive_hours {
            profile.productive_hours = label;
        }
        if let Some(aura) = self.aura {
            profile.aura = aura;
        }
        if let Some(settings) = self.pomodoro_settings {
            profile.pomodoro_settings = settings;
        }
        if let Some(streak) = self.streak {
            profile.streak = streak;
        }
        if let Some(date) = self.last_login_date {
            profile.last_login_date = date;
        }
        match self.theme {
            Some(theme) if theme != profile.theme => {
                profile.theme = theme;
                Some(theme)
            }
            _ => None,
        }
    }
}

/// Parse an "HH:MM" clock value
pub fn parse_clock(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|e| CoreError::parse_with_source(format!("Invalid time '{}', expected HH:MM", input), e))
}
