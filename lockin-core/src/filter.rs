//! Task history filtering and sorting
//!
//! Builder-style filter over completed tasks.

use std::str::FromStr;

use crate::error::CoreError;
use crate::task::{EnergyLevel, Priority, Task, TaskCategory};

/// Sort key for the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySort {
    /// Completion time
    #[default]
    Date,
    Category,
    Duration,
}

impl FromStr for HistorySort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "category" => Ok(Self::Category),
            "duration" => Ok(Self::Duration),
            other => Err(CoreError::parse(format!("Unknown sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Builder for filtering completed tasks
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub category: Option<TaskCategory>,
    pub priority: Option<Priority>,
    pub energy: Option<EnergyLevel>,
    /// Case-insensitive title search
    pub search: Option<String>,
    pub sort: HistorySort,
    pub order: SortOrder,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Option<TaskCategory>) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_energy(mut self, energy: Option<EnergyLevel>) -> Self {
        self.energy = energy;
        self
    }

    /// Filter by search term; blank terms are ignored
    pub fn with_search(mut self, term: Option<String>) -> Self {
        self.search = term.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn sort_by(mut self, sort: HistorySort) -> Self {
        self.sort = sort;
        self
    }

    pub fn ascending(mut self) -> Self {
        self.order = SortOrder::Ascending;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Check if a completed task matches this filter
    pub fn matches(&self, task: &Task) -> bool {
        if !task.is_complete() {
            return false;
        }

        if self.category.is_some_and(|c| c != task.category) {
            return false;
        }

        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }

        if self.energy.is_some_and(|e| e != task.energy_required) {
            return false;
        }

        if let Some(term) = &self.search {
            if !task.title.to_lowercase().contains(&term.trim().to_lowercase()) {
                return false;
            }
        }

        true
    }

    /// Apply filter and sort
    pub fn apply<'a>(&self, tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
        let mut filtered: Vec<&Task> = tasks.into_iter().filter(|t| self.matches(t)).collect();

        filtered.sort_by(|a, b| {
            let ordering = match self.sort {
                HistorySort::Date => a.completed_at().cmp(&b.completed_at()),
                HistorySort::Category => a.category.as_str().cmp(b.category.as_str()),
                HistorySort::Duration => a.focus_minutes().cmp(&b.focus_minutes()),
            };
            match self.order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });

        filtered
    }
}

/// Total logged focus minutes across a filtered list
pub fn total_minutes(tasks: &[&Task]) -> u32 {
    tasks.iter().fold(0u32, |acc, t| acc.saturating_add(t.focus_minutes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::{Duration, TimeZone, Utc};

    fn history() -> Vec<Task> {
        let base = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        vec![
            Task::from_draft(
                TaskDraft::new("Read paper")
                    .with_category(TaskCategory::Study)
                    .with_duration(40),
            )
            .with_completed_at(base),
            Task::from_draft(
                TaskDraft::new("Gym session")
                    .with_category(TaskCategory::Health)
                    .with_priority(Priority::High)
                    .with_duration(60),
            )
            .with_completed_at(base + Duration::days(2)),
            Task::from_draft(TaskDraft::new("Write paper").with_duration(20))
                .with_completed_at(base + Duration::days(1)),
            Task::from_draft(TaskDraft::new("Still open")),
        ]
    }

    #[test]
    fn test_default_is_newest_first() {
        let tasks = history();
        let results = HistoryFilter::new().apply(&tasks);

        let titles: Vec<&str> = results.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Gym session", "Write paper", "Read paper"]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let tasks = history();
        let results = HistoryFilter::new()
            .with_search(Some("PAPER".to_string()))
            .apply(&tasks);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_filter_by_category_and_priority() {
        let tasks = history();
        let study = HistoryFilter::new()
            .with_category(Some(TaskCategory::Study))
            .apply(&tasks);
        assert_eq!(study.len(), 1);
        assert_eq!(study[0].title, "Read paper");

        let high = HistoryFilter::new()
            .with_priority(Some(Priority::High))
            .apply(&tasks);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].title, "Gym session");
    }

    #[test]
    fn test_sort_by_duration_ascending() {
        let tasks = history();
        let results = HistoryFilter::new()
            .sort_by(HistorySort::Duration)
            .ascending()
            .apply(&tasks);

        let minutes: Vec<u32> = results.iter().map(|t| t.duration_minutes).collect();
        assert_eq!(minutes, vec![20, 40, 60]);
        assert_eq!(total_minutes(&results), 120);
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("Category".parse::<HistorySort>().unwrap(), HistorySort::Category);
        assert!("name".parse::<HistorySort>().is_err());
    }
}
