//! Daily schedule model
//!
//! A schedule is an ordered list of time slots, each either placing a task
//! or reserving a break.

use chrono::NaiveTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::task::{TaskCategory, TaskId};

/// Value stored in `taskId` for slots that are not tied to a task
pub const BREAK_TASK_ID: &str = "break";

// Regex pattern is a compile-time constant
static TIME_SLOT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*[-–]\s*(\d{1,2}):(\d{2})\s*$")
        .expect("Invalid time slot regex pattern")
});

/// Newtype wrapper for schedule item IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleId(pub String);

impl ScheduleId {
    pub fn generate() -> Self {
        ScheduleId(format!("sched-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A placed slot in the daily plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: ScheduleId,
    /// "HH:MM - HH:MM", kept verbatim
    pub time_slot: String,
    #[serde(default, with = "task_ref")]
    pub task_id: Option<TaskId>,
    pub title: String,
    pub category: TaskCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_break: bool,
}

impl ScheduleItem {
    /// Whether this slot places the given task
    pub fn references(&self, task_id: &TaskId) -> bool {
        self.task_id.as_ref() == Some(task_id)
    }

    /// Task this slot works on, None for breaks
    pub fn work_task(&self) -> Option<&TaskId> {
        if self.is_break {
            None
        } else {
            self.task_id.as_ref()
        }
    }

    pub fn parsed_slot(&self) -> Result<TimeSlot> {
        TimeSlot::parse(&self.time_slot)
    }
}

/// A schedule item that may not have an ID yet
///
/// This is what schedule synthesis produces; the store assigns IDs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub id: Option<ScheduleId>,
    pub time_slot: String,
    pub task_id: Option<TaskId>,
    pub title: String,
    pub category: TaskCategory,
    pub description: String,
    pub is_break: bool,
}

impl ScheduleDraft {
    pub fn new(time_slot: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: None,
            time_slot: time_slot.into(),
            task_id: None,
            title: title.into(),
            category: TaskCategory::default(),
            description: String::new(),
            is_break: false,
        }
    }

    pub fn for_task(mut self, task_id: impl Into<TaskId>, category: TaskCategory) -> Self {
        self.task_id = Some(task_id.into());
        self.category = category;
        self
    }

    pub fn as_break(mut self) -> Self {
        self.task_id = None;
        self.category = TaskCategory::Break;
        self.is_break = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Finalize into an item, generating an ID when missing
    pub fn into_item(self) -> ScheduleItem {
        ScheduleItem {
            id: self.id.unwrap_or_else(ScheduleId::generate),
            time_slot: self.time_slot,
            task_id: self.task_id,
            title: self.title,
            category: self.category,
            description: self.description,
            is_break: self.is_break,
        }
    }
}

/// Parsed "HH:MM - HH:MM" slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    pub fn parse(input: &str) -> Result<Self> {
        let caps = TIME_SLOT_REGEX
            .captures(input)
            .ok_or_else(|| CoreError::parse(format!("Invalid time slot: {}", input)))?;

        let clock = |h: usize, m: usize| -> Result<NaiveTime> {
            let hour: u32 = caps[h]
                .parse()
                .map_err(|e| CoreError::parse_with_source("Invalid hour", e))?;
            let minute: u32 = caps[m]
                .parse()
                .map_err(|e| CoreError::parse_with_source("Invalid minute", e))?;
            NaiveTime::from_hms_opt(hour, minute, 0)
                .ok_or_else(|| CoreError::parse(format!("Time out of range in slot: {}", input)))
        };

        Ok(Self {
            start: clock(1, 2)?,
            end: clock(3, 4)?,
        })
    }

    /// True when the end is earlier than the start, i.e. the slot runs past midnight
    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Move the element at `from` to position `to`
///
/// Returns false and leaves the list untouched when either index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// Serde adapter for the `taskId` field: the break sentinel maps to None
mod task_ref {
    use super::BREAK_TASK_ID;
    use crate::task::TaskId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<TaskId>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => serializer.serialize_str(id.as_str()),
            None => serializer.serialize_str(BREAK_TASK_ID),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TaskId>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(BREAK_TASK_ID) {
                None
            } else {
                Some(TaskId(trimmed.to_string()))
            }
        }))
    }
}
