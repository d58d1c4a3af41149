//! Saved task templates for quick re-entry

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::task::{EnergyLevel, Priority, TaskCategory, TaskDraft};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub id: String,
    pub title: String,
    pub duration_minutes: u32,
    pub priority: Priority,
    pub category: TaskCategory,
    pub energy_required: EnergyLevel,
}

impl TaskTemplate {
    /// Capture a draft as a template; the deadline is not kept
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.clean_title().unwrap_or_default().to_string(),
            duration_minutes: draft.duration_minutes,
            priority: draft.priority,
            category: draft.category,
            energy_required: draft.energy_required,
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft::new(self.title.clone())
            .with_duration(self.duration_minutes)
            .with_priority(self.priority)
            .with_category(self.category)
            .with_energy(self.energy_required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_template_drops_deadline() {
        let draft = TaskDraft::new("  Gym  ")
            .with_duration(45)
            .with_category(TaskCategory::Health)
            .with_deadline(NaiveDate::from_ymd_opt(2026, 1, 1));

        let template = TaskTemplate::from_draft(&draft);
        assert_eq!(template.title, "Gym");

        let back = template.to_draft();
        assert_eq!(back.duration_minutes, 45);
        assert_eq!(back.category, TaskCategory::Health);
        assert!(back.deadline.is_none());
    }
}
