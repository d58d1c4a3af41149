//! Parse and validate assistant responses
//!
//! Responses are JSON, sometimes wrapped in markdown fences or prose. Every
//! function here returns an error on malformed input and never panics.

use regex::Regex;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

use super::{BrainDump, ExtractedTask, Playlist, PlaylistVideo, SubTaskCandidate};
use crate::error::{CoreError, Result};
use crate::schedule::{BREAK_TASK_ID, ScheduleDraft};
use crate::task::{TaskCategory, TaskId};

// Regex patterns are compile-time constants
static OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").expect("Invalid object regex pattern"));
static ARRAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[\s\S]*\]").expect("Invalid array regex pattern"));
static DATA_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([\w/+.-]+);base64,([A-Za-z0-9+/=\s]+)$").expect("Invalid data URI regex pattern")
});

/// Expected number of sub-tasks in a breakdown
const SUBTASK_RANGE: std::ops::RangeInclusive<usize> = 3..=6;

/// Cut the JSON document out of a response
///
/// Picks whichever of the outermost object or array starts first.
pub fn extract_json(text: &str) -> Result<&str> {
    let object = OBJECT_REGEX.find(text);
    let array = ARRAY_REGEX.find(text);

    let found = match (object, array) {
        (Some(o), Some(a)) => {
            if a.start() < o.start() {
                a
            } else {
                o
            }
        }
        (Some(o), None) => o,
        (None, Some(a)) => a,
        (None, None) => return Err(CoreError::parse("No JSON found in assistant response")),
    };

    Ok(found.as_str())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawScheduleItem {
    time_slot: String,
    #[serde(default)]
    task_id: Option<String>,
    title: String,
    category: String,
    #[serde(default)]
    description: String,
    is_break: bool,
}

/// Validate a generated schedule
pub fn parse_schedule(text: &str) -> Result<Vec<ScheduleDraft>> {
    let raw: Vec<RawScheduleItem> = serde_json::from_str(extract_json(text)?)?;

    raw.into_iter()
        .enumerate()
        .map(|(index, item)| {
            if item.time_slot.trim().is_empty() {
                return Err(CoreError::validation(
                    "timeSlot",
                    format!("schedule item {} has no time slot", index),
                ));
            }

            let category = match TaskCategory::from_str(&item.category) {
                Ok(category) => category,
                Err(_) if item.is_break => TaskCategory::Break,
                Err(e) => return Err(e),
            };

            let mut draft = ScheduleDraft::new(item.time_slot.trim(), item.title.trim())
                .with_description(item.description);
            draft.category = category;

            if item.is_break {
                draft.is_break = true;
            } else {
                draft.task_id = item
                    .task_id
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty() && !id.eq_ignore_ascii_case(BREAK_TASK_ID))
                    .map(TaskId);
            }

            Ok(draft)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubTask {
    title: String,
    duration_minutes: f64,
    category: String,
    priority: String,
    energy_required: String,
}

/// Validate a task breakdown
pub fn parse_subtasks(text: &str) -> Result<Vec<SubTaskCandidate>> {
    let raw: Vec<RawSubTask> = serde_json::from_str(extract_json(text)?)?;

    if raw.is_empty() {
        return Err(CoreError::assistant("Breakdown returned no sub-tasks"));
    }
    if !SUBTASK_RANGE.contains(&raw.len()) {
        warn!(count = raw.len(), "Breakdown size outside the expected range");
    }

    raw.into_iter()
        .map(|item| {
            let title = item.title.trim();
            if title.is_empty() {
                return Err(CoreError::validation("title", "sub-task title is empty"));
            }
            if !item.duration_minutes.is_finite() || item.duration_minutes < 0.0 {
                return Err(CoreError::validation(
                    "durationMinutes",
                    format!("invalid duration {}", item.duration_minutes),
                ));
            }

            Ok(SubTaskCandidate {
                title: title.to_string(),
                duration_minutes: item.duration_minutes.round().min(f64::from(u32::MAX)) as u32,
                priority: item.priority.parse()?,
                category: item.category.parse()?,
                energy_required: item.energy_required.parse()?,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawBrainDump {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    tasks: Vec<RawExtractedTask>,
}

#[derive(Debug, Deserialize)]
struct RawExtractedTask {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    priority: Option<String>,
}

/// Validate a brain-dump summary
///
/// Tasks without a title are dropped; unknown priorities become Medium.
pub fn parse_brain_dump(text: &str) -> Result<BrainDump> {
    let raw: RawBrainDump = serde_json::from_str(extract_json(text)?)?;

    let tasks = raw
        .tasks
        .into_iter()
        .filter_map(|task| {
            let title = task.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let priority = task
                .priority
                .and_then(|p| p.parse().ok())
                .unwrap_or_default();
            Some(ExtractedTask { title, priority })
        })
        .collect();

    Ok(BrainDump {
        summary: raw
            .summary
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| super::BRAIN_DUMP_EMPTY.to_string()),
        tasks,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlaylist {
    playlist_title: String,
    #[serde(default)]
    videos: Vec<RawVideo>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    title: String,
    #[serde(default)]
    number: Option<u32>,
}

/// Validate an imported playlist
///
/// Missing video numbers are filled in from list position.
pub fn parse_playlist(text: &str) -> Result<Playlist> {
    let raw: RawPlaylist = serde_json::from_str(extract_json(text)?)?;

    let title = raw.playlist_title.trim();
    if title.is_empty() {
        return Err(CoreError::validation("playlistTitle", "playlist has no title"));
    }

    let videos: Vec<PlaylistVideo> = raw
        .videos
        .into_iter()
        .enumerate()
        .filter(|(_, v)| !v.title.trim().is_empty())
        .map(|(i, v)| PlaylistVideo {
            title: v.title.trim().to_string(),
            number: v.number.unwrap_or(i as u32 + 1),
        })
        .collect();

    debug!(title, videos = videos.len(), "Parsed playlist");

    Ok(Playlist {
        title: title.to_string(),
        videos,
    })
}

/// Build a base64 data URI
pub fn data_uri(mime: &str, base64_data: &str) -> String {
    format!("data:{};base64,{}", mime, base64_data)
}

/// Split a base64 data URI into its MIME type and payload
pub fn parse_data_uri(uri: &str) -> Result<(&str, &str)> {
    let caps = DATA_URI_REGEX
        .captures(uri.trim())
        .ok_or_else(|| CoreError::parse("Not a base64 data URI"))?;

    match (caps.get(1), caps.get(2)) {
        (Some(mime), Some(data)) => Ok((mime.as_str(), data.as_str())),
        _ => Err(CoreError::parse("Not a base64 data URI")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    #[test]
    fn test_extract_json_from_fences() {
        let text = "Sure! Here you go:\n```json\n{\"a\": [1, 2]}\n```\nEnjoy";
        assert_eq!(extract_json(text).unwrap(), "{\"a\": [1, 2]}");

        let array = "[{\"x\": 1}]";
        assert_eq!(extract_json(array).unwrap(), array);

        assert!(extract_json("no json here").is_err());
    }

    #[test]
    fn test_parse_schedule() {
        let text = r#"[
            {"timeSlot": "09:00 - 10:00", "taskId": "t-1", "title": "Write report",
             "category": "Work", "description": "Academic weapon mode", "isBreak": false},
            {"timeSlot": "10:00 - 10:15", "taskId": "break", "title": "Touch Grass",
             "category": "Recovery", "description": "Go outside", "isBreak": true}
        ]"#;

        let items = parse_schedule(text).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].task_id, Some(TaskId::from("t-1")));
        assert_eq!(items[0].category, TaskCategory::Work);
        assert!(items[1].is_break);
        assert_eq!(items[1].task_id, None);
        assert_eq!(items[1].category, TaskCategory::Break);
    }

    #[test]
    fn test_parse_schedule_rejects_bad_payloads() {
        // missing isBreak
        assert!(parse_schedule(r#"[{"timeSlot": "09:00 - 10:00", "title": "x", "category": "Work"}]"#).is_err());
        // wrong type
        assert!(parse_schedule(r#"[{"timeSlot": 9, "title": "x", "category": "Work", "isBreak": false}]"#).is_err());
        // unknown category on a work slot
        assert!(parse_schedule(r#"[{"timeSlot": "09:00 - 10:00", "title": "x", "category": "Vibes", "isBreak": false}]"#).is_err());
        assert!(parse_schedule("not json").is_err());
    }

    #[test]
    fn test_parse_subtasks() {
        let text = r#"[
            {"title": "Outline", "durationMinutes": 14.6, "category": "Work", "priority": "High", "energyRequired": "High"},
            {"title": "Draft", "durationMinutes": 45, "category": "Work", "priority": "medium", "energyRequired": "Medium"},
            {"title": "Proofread", "durationMinutes": 20, "category": "Work", "priority": "Low", "energyRequired": "Low"}
        ]"#;

        let subtasks = parse_subtasks(text).unwrap();
        assert_eq!(subtasks.len(), 3);
        assert_eq!(subtasks[0].duration_minutes, 15);
        assert_eq!(subtasks[1].priority, Priority::Medium);
        assert_eq!(subtasks[2].to_draft().title, "Proofread");
    }

    #[test]
    fn test_parse_subtasks_rejects_unknown_levels() {
        let text = r#"[{"title": "A", "durationMinutes": 10, "category": "Work", "priority": "Urgent", "energyRequired": "High"}]"#;
        assert!(parse_subtasks(text).is_err());
        assert!(parse_subtasks("[]").is_err());
    }

    #[test]
    fn test_parse_brain_dump() {
        let text = r#"{"summary": "Lowkey stressed", "tasks": [
            {"title": "Email prof", "priority": "High"},
            {"title": "Laundry", "priority": "whenever"},
            {"title": "  "},
            {"priority": "Low"}
        ]}"#;

        let dump = parse_brain_dump(text).unwrap();
        assert_eq!(dump.summary, "Lowkey stressed");
        assert_eq!(dump.tasks.len(), 2);
        assert_eq!(dump.tasks[0].priority, Priority::High);
        assert_eq!(dump.tasks[1].priority, Priority::Medium);
    }

    #[test]
    fn test_parse_playlist() {
        let text = "Here it is: {\"playlistTitle\": \"Rust\", \"videos\": [{\"title\": \"Intro\", \"number\": 1}, {\"title\": \"Ownership\"}]}";

        let playlist = parse_playlist(text).unwrap();
        assert_eq!(playlist.title, "Rust");
        assert_eq!(playlist.videos[1].number, 2);

        assert!(parse_playlist(r#"{"videos": []}"#).is_err());
    }

    #[test]
    fn test_data_uri() {
        let uri = data_uri("image/png", "aGVsbG8=");
        assert_eq!(uri, "data:image/png;base64,aGVsbG8=");
        assert_eq!(parse_data_uri(&uri).unwrap(), ("image/png", "aGVsbG8="));
        assert!(parse_data_uri("https://example.com/a.png").is_err());
    }
}
