//! Boundary to the external AI collaborator
//!
//! The [`Assistant`] trait is implemented by a network client in the front
//! end. Everything the collaborator sends back is untyped text and goes
//! through the validators in [`parse`] before it reaches the store.

pub mod parse;
pub mod prompts;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;
use crate::profile::UserProfile;
use crate::schedule::{ScheduleDraft, ScheduleItem};
use crate::task::{EnergyLevel, Priority, Task, TaskCategory, TaskDraft};

pub use parse::{
    data_uri, extract_json, parse_brain_dump, parse_data_uri, parse_playlist, parse_schedule,
    parse_subtasks,
};

pub const DEFAULT_CONTEXT: &str = "Standard productivity flow";

pub const NUDGE_EMPTY: &str = "Stay focused, bestie.";
pub const NUDGE_FAILED: &str = "Focus aligned.";
pub const ROAST_NO_SCHEDULE: &str =
    "You have no schedule. That's the biggest L of all. Do something.";
pub const ROAST_EMPTY: &str = "Your schedule is so mid I can't even roast it.";
pub const ROAST_FAILED: &str = "Error generating roast. You got lucky.";
pub const BRAIN_DUMP_EMPTY: &str = "Just yapping.";
pub const BRAIN_DUMP_FAILED: &str = "Couldn't read the yap.";

const PLAYLIST_VIDEO_MINUTES: u32 = 20;

/// AI features used by the app
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Plan the day; an empty task list yields an empty schedule
    async fn generate_schedule(
        &self,
        tasks: &[Task],
        profile: &UserProfile,
        context: Option<&str>,
    ) -> Result<Vec<ScheduleDraft>>;

    /// Split a large task into smaller ones
    async fn break_down_task(&self, title: &str) -> Result<Vec<SubTaskCandidate>>;

    /// Summarize free text and pull out tasks; never fails
    async fn summarize_free_text(&self, text: &str) -> BrainDump;

    /// One-line encouragement; never fails
    async fn motivational_line(&self, completed: usize, remaining: usize) -> String;

    /// Humorous critique of the schedule; never fails
    async fn roast_line(&self, schedule: &[ScheduleItem]) -> String;

    /// Render the schedule as an image, returned as a data URI
    async fn generate_infographic(&self, schedule: &[ScheduleItem]) -> Result<String>;

    /// Look up a video playlist's title and entries
    async fn import_playlist(&self, url: &str) -> Result<Playlist>;
}

/// A proposed sub-task from a breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubTaskCandidate {
    pub title: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: TaskCategory,
    pub energy_required: EnergyLevel,
}

impl SubTaskCandidate {
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::new(self.title.clone())
            .with_duration(self.duration_minutes)
            .with_priority(self.priority)
            .with_category(self.category)
            .with_energy(self.energy_required)
    }
}

/// Summary of a free-text brain dump and the tasks found in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrainDump {
    pub summary: String,
    pub tasks: Vec<ExtractedTask>,
}

impl BrainDump {
    pub fn failed() -> Self {
        Self {
            summary: BRAIN_DUMP_FAILED.to_string(),
            tasks: Vec::new(),
        }
    }

    /// Extracted tasks as drafts with the default duration, category and energy
    pub fn to_drafts(&self) -> Vec<TaskDraft> {
        self.tasks
            .iter()
            .map(|t| TaskDraft::new(t.title.clone()).with_priority(t.priority))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTask {
    pub title: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub title: String,
    pub videos: Vec<PlaylistVideo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVideo {
    pub title: String,
    pub number: u32,
}

impl Playlist {
    /// Drafts for the selected video numbers, or every video when `selected` is None
    pub fn to_drafts(&self, selected: Option<&[u32]>) -> Vec<TaskDraft> {
        self.videos
            .iter()
            .filter(|v| selected.is_none_or(|numbers| numbers.contains(&v.number)))
            .map(|v| {
                TaskDraft::new(format!("Watch: {}", v.title))
                    .with_duration(PLAYLIST_VIDEO_MINUTES)
                    .with_priority(Priority::Medium)
                    .with_category(TaskCategory::Study)
                    .with_energy(EnergyLevel::Low)
            })
            .collect()
    }
}

/// Turn a raw nudge response into the line to show
pub fn nudge_or_fallback(response: Result<String>) -> String {
    match response {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => NUDGE_EMPTY.to_string(),
        Err(e) => {
            warn!(error = %e, "Nudge request failed");
            NUDGE_FAILED.to_string()
        }
    }
}

/// Turn a raw roast response into the line to show
pub fn roast_or_fallback(response: Result<String>) -> String {
    match response {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => ROAST_EMPTY.to_string(),
        Err(e) => {
            warn!(error = %e, "Roast request failed");
            ROAST_FAILED.to_string()
        }
    }
}

/// Turn a raw brain-dump response into a summary, falling back on any failure
pub fn brain_dump_or_fallback(response: Result<String>) -> BrainDump {
    let raw = match response {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Brain dump request failed");
            return BrainDump::failed();
        }
    };

    if raw.trim().is_empty() {
        return BrainDump {
            summary: BRAIN_DUMP_EMPTY.to_string(),
            tasks: Vec::new(),
        };
    }

    parse_brain_dump(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "Brain dump response was unusable");
        BrainDump::failed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_nudge_fallbacks() {
        assert_eq!(nudge_or_fallback(Ok("  We ball.  ".to_string())), "We ball.");
        assert_eq!(nudge_or_fallback(Ok(String::new())), NUDGE_EMPTY);
        assert_eq!(nudge_or_fallback(Err(CoreError::assistant("down"))), NUDGE_FAILED);
    }

    #[test]
    fn test_roast_fallbacks() {
        assert_eq!(roast_or_fallback(Ok("\n".to_string())), ROAST_EMPTY);
        assert_eq!(roast_or_fallback(Err(CoreError::assistant("down"))), ROAST_FAILED);
    }

    #[test]
    fn test_brain_dump_fallbacks() {
        let failed = brain_dump_or_fallback(Err(CoreError::assistant("down")));
        assert_eq!(failed.summary, BRAIN_DUMP_FAILED);
        assert!(failed.tasks.is_empty());

        assert_eq!(brain_dump_or_fallback(Ok(String::new())).summary, BRAIN_DUMP_EMPTY);
        assert_eq!(brain_dump_or_fallback(Ok("lol no".to_string())).summary, BRAIN_DUMP_FAILED);
    }

    #[test]
    fn test_brain_dump_drafts_use_defaults() {
        let dump = BrainDump {
            summary: "busy".to_string(),
            tasks: vec![ExtractedTask {
                title: "Email prof".to_string(),
                priority: Priority::High,
            }],
        };

        let drafts = dump.to_drafts();
        assert_eq!(drafts[0].duration_minutes, 30);
        assert_eq!(drafts[0].priority, Priority::High);
        assert_eq!(drafts[0].category, TaskCategory::Work);
        assert_eq!(drafts[0].energy_required, EnergyLevel::Medium);
    }

    #[test]
    fn test_playlist_drafts() {
        let playlist = Playlist {
            title: "Rust course".to_string(),
            videos: vec![
                PlaylistVideo {
                    title: "Ownership".to_string(),
                    number: 1,
                },
                PlaylistVideo {
                    title: "Traits".to_string(),
                    number: 2,
                },
            ],
        };

        let all = playlist.to_drafts(None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Watch: Ownership");
        assert_eq!(all[0].duration_minutes, 20);
        assert_eq!(all[0].category, TaskCategory::Study);
        assert_eq!(all[0].energy_required, EnergyLevel::Low);

        let picked = playlist.to_drafts(Some(&[2]));
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].title, "Watch: Traits");
    }
}
