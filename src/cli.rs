use clap::{Parser, Subcommand};

use lockin_core::analytics::TimeRange;
use lockin_core::{EnergyLevel, HistorySort, Priority, TaskCategory, Theme};

#[derive(Parser)]
#[command(name = "lockin")]
#[command(about = concat!(
    ">>=====================================<<\n",
    "||  _     ___   ____ _  __  ___ _   _  ||\n",
    "|| | |   / _ \\ / ___| |/ / |_ _| \\ | | ||\n",
    "|| | |  | | | | |   | ' /   | ||  \\| | ||\n",
    "|| | |__| |_| | |___| . \\   | || |\\  | ||\n",
    "|| |_____\\___/ \\____|_|\\_\\ |___|_| \\_| ||\n",
    ">>=====================================<<\n",
    "~Plan the day, farm aura, stay locked in~"
))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Estimated duration in minutes
        #[arg(long, short = 'm', default_value_t = 30)]
        minutes: u32,
        /// High, Medium or Low
        #[arg(long, short = 'p', default_value = "medium")]
        priority: Priority,
        /// Work, Study, Health, Personal or Break
        #[arg(long, short = 'C', default_value = "work")]
        category: TaskCategory,
        /// Energy the task needs
        #[arg(long, short = 'e', default_value = "medium")]
        energy: EnergyLevel,
        /// Deadline, e.g. 2026-11-01 or "next friday"
        #[arg(long, short = 'd', value_name = "DATE")]
        deadline: Option<String>,
    },

    /// Lists open tasks
    List {
        /// Include completed tasks
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Edit a task's fields
    Edit {
        /// Task ID or unique prefix
        id: String,
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
        #[arg(long, short = 'm')]
        minutes: Option<u32>,
        #[arg(long, short = 'p')]
        priority: Option<Priority>,
        #[arg(long, short = 'C')]
        category: Option<TaskCategory>,
        #[arg(long, short = 'e')]
        energy: Option<EnergyLevel>,
        /// New deadline (use 'none' to clear)
        #[arg(long, short = 'd', value_name = "DATE")]
        deadline: Option<String>,
    },

    /// Removes a task and its schedule slots
    Remove {
        /// Task ID or unique prefix
        id: String,
    },

    /// Toggles task completion status
    Check {
        /// Task ID or unique prefix
        id: String,
    },

    /// Log minutes of work on a task
    Log {
        /// Task ID or unique prefix
        id: String,
        minutes: u32,
    },

    /// Clear completed tasks
    Clear {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Let the assistant build today's schedule from open tasks
    Plan {
        /// Strategy for the day, e.g. "Deep Work" or "Chill"
        #[arg(long, short = 'c', value_name = "TEXT")]
        context: Option<String>,
    },

    /// Show today's schedule
    Schedule,

    /// Move a schedule slot (1-based positions)
    Reorder { from: usize, to: usize },

    /// Run a focus session on a schedule slot
    Focus {
        /// Slot number from `lockin schedule`
        slot: usize,
        /// Countdown length
        #[arg(long, short = 'm', default_value_t = lockin_core::timer::FOCUS_SESSION_MINUTES)]
        minutes: u32,
    },

    /// Run a Pomodoro cycle with the profile's settings
    Pomo,

    /// Show productivity stats
    Stats {
        /// today, week or month
        #[arg(long, short = 'r', default_value = "week")]
        range: TimeRange,
    },

    /// Browse completed tasks
    History {
        #[arg(long, short = 'C')]
        category: Option<TaskCategory>,
        #[arg(long, short = 'p')]
        priority: Option<Priority>,
        #[arg(long, short = 'e')]
        energy: Option<EnergyLevel>,
        /// Filter titles containing text (case-insensitive)
        #[arg(long, short = 's', value_name = "TERM")]
        search: Option<String>,
        /// date, category or duration
        #[arg(long, default_value = "date")]
        sort: HistorySort,
        /// Oldest or shortest first
        #[arg(long)]
        asc: bool,
    },

    /// Split a big task into smaller ones
    Breakdown {
        /// Task ID or unique prefix
        id: String,
        /// Comma-separated suggestion numbers to keep
        #[arg(long, value_delimiter = ',')]
        pick: Option<Vec<usize>>,
        /// Add the suggestions without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Turn free text into tasks (reads stdin when no text is given)
    Dump { text: Vec<String> },

    /// Get a motivational line
    Nudge,

    /// Get today's schedule roasted
    Roast,

    /// Render today's schedule as an image
    Infographic {
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<String>,
    },

    /// Export today's schedule as an iCalendar file
    Export {
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<String>,
        /// Day the schedule runs on (defaults to today)
        #[arg(long, short = 'd', value_name = "DATE")]
        date: Option<String>,
    },

    /// Turn a YouTube playlist into study tasks
    Playlist {
        url: String,
        /// Comma-separated video numbers to keep
        #[arg(long, value_delimiter = ',')]
        pick: Option<Vec<u32>>,
        /// Add the videos without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Show or change the profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Manage task templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Restore state files from their backups
    Recover {
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Profile subcommands
#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show level, aura and settings
    Show,
    /// Change profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        /// HH:MM
        #[arg(long)]
        wake: Option<String>,
        /// HH:MM
        #[arg(long)]
        sleep: Option<String>,
        /// e.g. "morning" or "late night"
        #[arg(long)]
        productive: Option<String>,
        /// Focus minutes per Pomodoro
        #[arg(long)]
        work: Option<u32>,
        #[arg(long)]
        short_break: Option<u32>,
        #[arg(long)]
        long_break: Option<u32>,
        #[arg(long)]
        auto_breaks: Option<bool>,
        #[arg(long)]
        auto_focus: Option<bool>,
    },
    /// Switch theme (lists themes when none is given)
    Theme { theme: Option<Theme> },
}

/// Template subcommands
#[derive(Subcommand)]
pub enum TemplateAction {
    /// Save a task as a template
    Save {
        /// Task ID or unique prefix
        id: String,
    },
    /// List templates
    List,
    /// Remove a template
    Remove { id: String },
    /// Add a task from a template
    Use { id: String },
}
