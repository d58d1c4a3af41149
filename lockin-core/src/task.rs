//! Task domain model
//!
//! Pure domain logic for tasks with no I/O operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Default estimate for tasks created without one
pub const DEFAULT_DURATION_MINUTES: u32 = 30;

/// Newtype wrapper for task IDs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generate a fresh random ID
    pub fn generate() -> Self {
        TaskId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, enough to tell tasks apart on screen
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        TaskId(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        TaskId(id.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How important a task is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(Priority::High),
            "medium" | "med" | "m" => Ok(Priority::Medium),
            "low" | "l" => Ok(Priority::Low),
            other => Err(CoreError::parse(format!("Unknown priority '{}'", other))),
        }
    }
}

/// Energy a task demands from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnergyLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl EnergyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::High => "High",
            EnergyLevel::Medium => "Medium",
            EnergyLevel::Low => "Low",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" | "h" => Ok(EnergyLevel::High),
            "medium" | "med" | "m" => Ok(EnergyLevel::Medium),
            "low" | "l" => Ok(EnergyLevel::Low),
            other => Err(CoreError::parse(format!("Unknown energy level '{}'", other))),
        }
    }
}

/// Life area a task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskCategory {
    #[default]
    Work,
    Study,
    Health,
    Personal,
    Break,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Work => "Work",
            TaskCategory::Study => "Study",
            TaskCategory::Health => "Health",
            TaskCategory::Personal => "Personal",
            TaskCategory::Break => "Break",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "work" => Ok(TaskCategory::Work),
            "study" => Ok(TaskCategory::Study),
            "health" => Ok(TaskCategory::Health),
            "personal" => Ok(TaskCategory::Personal),
            "break" => Ok(TaskCategory::Break),
            other => Err(CoreError::parse(format!("Unknown category '{}'", other))),
        }
    }
}

/// The user-editable fields of a task
///
/// Used both to create tasks and to replace the fields of an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: TaskCategory,
    pub energy_required: EnergyLevel,
    pub deadline: Option<NaiveDate>,
}

impl TaskDraft {
    /// Create a draft with default estimate, priority, category and energy
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            priority: Priority::default(),
            category: TaskCategory::default(),
            energy_required: EnergyLevel::default(),
            deadline: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_energy(mut self, energy: EnergyLevel) -> Self {
        self.energy_required = energy;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Title with surrounding whitespace removed, None when nothing is left
    pub fn clean_title(&self) -> Option<&str> {
        let title = self.title.trim();
        (!title.is_empty()).then_some(title)
    }

    pub fn validate(&self) -> Result<()> {
        if self.clean_title().is_none() {
            return Err(CoreError::validation("title", "Title cannot be empty"));
        }
        Ok(())
    }
}

/// A single task
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: TaskCategory,
    pub energy_required: EnergyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    /// Minutes logged against this task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<u32>,
}

impl Task {
    /// Create a new open task from a draft, with a fresh ID
    pub fn from_draft(draft: TaskDraft) -> Self {
        let title = draft.clean_title().unwrap_or_default().to_string();
        Self {
            id: TaskId::generate(),
            title,
            duration_minutes: draft.duration_minutes,
            priority: draft.priority,
            category: draft.category,
            energy_required: draft.energy_required,
            deadline: draft.deadline,
            completed: false,
            completed_at: None,
            time_spent: Some(0),
        }
    }

    /// Builder method to set task ID
    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder method to mark the task complete at the given instant
    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.mark_complete(at);
        self
    }

    /// Builder method to set logged time
    pub fn with_time_spent(mut self, minutes: Option<u32>) -> Self {
        self.time_spent = minutes;
        self
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn mark_complete(&mut self, at: DateTime<Utc>) {
        self.completed = true;
        self.completed_at = Some(at);
    }

    pub fn mark_incomplete(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Flip completion, returns the new state
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            self.mark_incomplete();
        } else {
            self.mark_complete(now);
        }
        self.completed
    }

    pub fn add_time_spent(&mut self, minutes: u32) {
        self.time_spent = Some(self.time_spent.unwrap_or(0).saturating_add(minutes));
    }

    /// Logged time when there is any, the estimate otherwise
    pub fn focus_minutes(&self) -> u32 {
        match self.time_spent {
            Some(spent) if spent > 0 => spent,
            _ => self.duration_minutes,
        }
    }

    /// Replace every editable field with the draft's values
    pub fn apply(&mut self, draft: TaskDraft) {
        if let Some(title) = draft.clean_title() {
            self.title = title.to_string();
        }
        self.duration_minutes = draft.duration_minutes;
        self.priority = draft.priority;
        self.category = draft.category;
        self.energy_required = draft.energy_required;
        self.deadline = draft.deadline;
    }

    /// Editable fields as a draft, for partial edits
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            duration_minutes: self.duration_minutes,
            priority: self.priority,
            category: self.category,
            energy_required: self.energy_required,
            deadline: self.deadline,
        }
    }

    /// Check if the deadline has passed without the task being done
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.deadline {
            Some(deadline) => deadline < today && !self.completed,
            None => false,
        }
    }

    /// Restore the completion invariant on records read from storage
    ///
    /// `completedAt` wins: a timestamp means complete, no timestamp means open.
    /// Returns true when the record had to be changed.
    pub fn repair(&mut self) -> bool {
        let should_be_complete = self.completed_at.is_some();
        if self.completed != should_be_complete {
            self.completed = should_be_complete;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::from_draft(
            TaskDraft::new("Write report")
                .with_duration(60)
                .with_priority(Priority::High)
                .with_category(TaskCategory::Work)
                .with_energy(EnergyLevel::High),
        )
    }

    #[test]
    fn test_task_creation() {
        let task = sample();

        assert_eq!(task.title, "Write report");
        assert_eq!(task.duration_minutes, 60);
        assert!(!task.is_complete());
        assert!(task.completed_at().is_none());
        assert_eq!(task.time_spent, Some(0));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(sample().id, sample().id);
    }

    #[test]
    fn test_toggle_keeps_completed_at_in_sync() {
        let now = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let mut task = sample();

        assert!(task.toggle_complete(now));
        assert_eq!(task.completed_at(), Some(now));

        assert!(!task.toggle_complete(now));
        assert!(task.completed_at().is_none());
    }

    #[test]
    fn test_focus_minutes_prefers_logged_time() {
        let task = sample().with_time_spent(Some(45));
        assert_eq!(task.focus_minutes(), 45);

        let task = sample().with_time_spent(Some(0));
        assert_eq!(task.focus_minutes(), 60);

        let task = sample().with_time_spent(None);
        assert_eq!(task.focus_minutes(), 60);
    }

    #[test]
    fn test_add_time_spent_is_additive() {
        let mut task = sample().with_time_spent(None);
        task.add_time_spent(10);
        task.add_time_spent(0);
        task.add_time_spent(5);
        assert_eq!(task.time_spent, Some(15));
    }

    #[test]
    fn test_json_roundtrip() {
        let at = Utc.with_ymd_and_hms(2026, 1, 25, 18, 30, 5).unwrap();
        let mut original = sample()
            .with_completed_at(at)
            .with_time_spent(Some(42))
            .with_id("abc-123");
        original.deadline = NaiveDate::from_ymd_opt(2026, 2, 1);

        let json = serde_json::to_string(&original).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, original);
        assert!(json.contains("\"durationMinutes\":60"));
        assert!(json.contains("\"energyRequired\":\"High\""));
    }

    #[test]
    fn test_repair_trusts_completed_at() {
        let json = r#"{"id":"x","title":"t","durationMinutes":5,"priority":"Low",
            "category":"Study","energyRequired":"Low","completed":true}"#;
        let mut task: Task = serde_json::from_str(json).unwrap();

        assert!(task.repair());
        assert!(!task.is_complete());
        assert!(!task.repair());
    }

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" low ".parse::<EnergyLevel>().unwrap(), EnergyLevel::Low);
        assert_eq!("study".parse::<TaskCategory>().unwrap(), TaskCategory::Study);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_draft_validation() {
        assert!(TaskDraft::new("   ").validate().is_err());
        assert!(TaskDraft::new(" ok ").validate().is_ok());
        assert_eq!(TaskDraft::new(" ok ").clean_title(), Some("ok"));
    }

    #[test]
    fn test_is_overdue() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let task = Task::from_draft(
            TaskDraft::new("late").with_deadline(NaiveDate::from_ymd_opt(2026, 5, 9)),
        );
        assert!(task.is_overdue(today));

        let task = Task::from_draft(TaskDraft::new("someday"));
        assert!(!task.is_overdue(today));
    }
}
