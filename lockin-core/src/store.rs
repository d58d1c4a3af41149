//! Local state store
//!
//! Single source of truth for tasks, the daily schedule, the user profile
//! and saved templates. Every mutation updates memory first and then
//! mirrors the affected collection to a [`StorageBackend`]. A backend that
//! fails to write never blocks the session; the failure is logged and the
//! in-memory state stays current.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::profile::{AURA_PER_TASK, ProfileUpdate, StreakChange, Theme, UserProfile};
use crate::schedule::{ScheduleDraft, ScheduleItem, move_item};
use crate::task::{Task, TaskDraft, TaskId};
use crate::template::TaskTemplate;
use crate::timer::FocusOutcome;

const COMPLETION_CHEERS: [&str; 4] = ["+100 AURA", "COMBO BREAK!", "QUEST COMPLETE", "XP GAINED"];

/// Logical keys of the durable key-value storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Schedule,
    Profile,
    Templates,
}

impl StorageKey {
    pub const ALL: [StorageKey; 4] = [
        StorageKey::Tasks,
        StorageKey::Schedule,
        StorageKey::Profile,
        StorageKey::Templates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Tasks => "tasks",
            StorageKey::Schedule => "schedule",
            StorageKey::Profile => "profile",
            StorageKey::Templates => "templates",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable string storage, one JSON document per key
pub trait StorageBackend {
    /// Read the raw value, `Ok(None)` when the key was never written
    fn read(&self, key: StorageKey) -> Result<Option<String>>;

    fn write(&mut self, key: StorageKey, value: &str) -> Result<()>;
}

/// In-memory backend, used for tests and as a fallback
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<StorageKey, String>,
    unavailable: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose writes always fail
    pub fn unavailable() -> Self {
        Self {
            values: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn with_value(mut self, key: StorageKey, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: StorageKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.values.get(&key).cloned())
    }

    fn write(&mut self, key: StorageKey, value: &str) -> Result<()> {
        if self.unavailable {
            return Err(CoreError::storage(format!("cannot write {}: storage is unavailable", key)));
        }
        self.values.insert(key, value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// Short user-facing message about something that just happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Receives notices and theme changes from the store
pub trait StoreObserver {
    fn notice(&mut self, _notice: &Notice) {}

    fn theme_changed(&mut self, _theme: Theme) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl StoreObserver for SilentObserver {}

/// The in-memory state plus its backend
pub struct Store<B: StorageBackend, O: StoreObserver = SilentObserver> {
    backend: B,
    observer: O,
    tasks: Vec<Task>,
    schedule: Vec<ScheduleItem>,
    profile: UserProfile,
    templates: Vec<TaskTemplate>,
}

impl<B: StorageBackend, O: StoreObserver> Store<B, O> {
    /// Load every collection from the backend
    ///
    /// Absent keys give defaults. A collection that cannot be parsed is
    /// replaced by its default without affecting the others.
    pub fn load(backend: B, mut observer: O) -> Self {
        let mut tasks: Vec<Task> = load_value(&backend, StorageKey::Tasks).unwrap_or_default();
        let repaired = tasks.iter_mut().map(Task::repair).filter(|changed| *changed).count();
        if repaired > 0 {
            warn!(count = repaired, "Repaired tasks with inconsistent completion state");
        }

        let schedule: Vec<ScheduleItem> =
            load_value(&backend, StorageKey::Schedule).unwrap_or_default();
        let templates: Vec<TaskTemplate> =
            load_value(&backend, StorageKey::Templates).unwrap_or_default();
        let stored_profile: Option<UserProfile> = load_value(&backend, StorageKey::Profile);
        let first_run = stored_profile.is_none();
        let profile = stored_profile.unwrap_or_default();

        observer.theme_changed(profile.theme);

        let mut store = Self {
            backend,
            observer,
            tasks,
            schedule,
            profile,
            templates,
        };

        if first_run {
            store.save_profile();
        }

        debug!(
            tasks = store.tasks.len(),
            schedule = store.schedule.len(),
            templates = store.templates.len(),
            "Store loaded"
        );
        store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn schedule(&self) -> &[ScheduleItem] {
        &self.schedule
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn templates(&self) -> &[TaskTemplate] {
        &self.templates
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Open tasks in list order
    pub fn active_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.is_complete()).collect()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_complete()).count()
    }

    /// Find a task by full ID or unique ID prefix
    pub fn resolve_task(&self, query: &str) -> Result<TaskId> {
        let query = query.trim();
        if let Some(task) = self.tasks.iter().find(|t| t.id.as_str() == query) {
            return Ok(task.id.clone());
        }

        let matches: Vec<&Task> = if query.is_empty() {
            Vec::new()
        } else {
            self.tasks
                .iter()
                .filter(|t| t.id.as_str().starts_with(query))
                .collect()
        };

        match matches.as_slice() {
            [task] => Ok(task.id.clone()),
            [] => Err(CoreError::TaskNotFound(query.to_string())),
            _ => Err(CoreError::validation(
                "id",
                format!("'{}' matches {} tasks, use more characters", query, matches.len()),
            )),
        }
    }

    /// Add a task; an empty title is ignored and returns None
    pub fn add_task(&mut self, draft: TaskDraft) -> Option<TaskId> {
        if draft.validate().is_err() {
            debug!("Ignoring task with empty title");
            return None;
        }

        let task = Task::from_draft(draft);
        let id = task.id.clone();
        debug!(id = %id, title = %task.title, "Adding task");
        self.tasks.push(task);
        self.save_tasks();
        self.observer.notice(&Notice::success("NEW QUEST ACQUIRED"));
        Some(id)
    }

    /// Add several tasks at once with a single summary notice
    pub fn add_tasks(&mut self, drafts: impl IntoIterator<Item = TaskDraft>) -> Vec<TaskId> {
        let mut added = Vec::new();
        for draft in drafts {
            if draft.validate().is_err() {
                continue;
            }
            let task = Task::from_draft(draft);
            added.push(task.id.clone());
            self.tasks.push(task);
        }

        if !added.is_empty() {
            self.save_tasks();
            self.observer
                .notice(&Notice::success(format!("EXTRACTED {} TASKS", added.len())));
        }
        added
    }

    /// Replace the editable fields of a task
    ///
    /// Schedule slots that place the task pick up its new title and category.
    /// Unknown IDs and empty titles are ignored.
    pub fn edit_task(&mut self, id: &TaskId, draft: TaskDraft) -> bool {
        if draft.validate().is_err() {
            return false;
        }
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            return false;
        };

        task.apply(draft);
        let title = task.title.clone();
        let category = task.category;

        for item in self.schedule.iter_mut().filter(|item| item.references(id)) {
            item.title = title.clone();
            item.category = category;
        }

        self.save_tasks();
        self.save_schedule();
        self.observer.notice(&Notice::success("QUEST DATA UPDATED"));
        true
    }

    /// Remove a task and every schedule slot that places it
    pub fn delete_task(&mut self, id: &TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| &t.id == id)?;
        let removed = self.tasks.remove(pos);

        self.schedule.retain(|item| !item.references(id));

        self.save_tasks();
        self.save_schedule();
        self.observer.notice(&Notice::info("QUEST ABANDONED"));
        Some(removed)
    }

    /// Flip completion and move aura by the fixed reward
    ///
    /// Returns the new completion state, None for unknown IDs.
    pub fn toggle_task_completion(&mut self, id: &TaskId, now: DateTime<Utc>) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| &t.id == id)?;
        let completed = task.toggle_complete(now);

        let reward = i64::from(AURA_PER_TASK);
        self.profile.adjust_aura(if completed { reward } else { -reward });

        self.save_tasks();
        self.save_profile();

        if completed {
            let cheer = COMPLETION_CHEERS[self.completed_count() % COMPLETION_CHEERS.len()];
            self.observer.notice(&Notice::success(cheer));
        }
        Some(completed)
    }

    /// Add minutes to a task's logged time
    pub fn log_time_spent(&mut self, id: &TaskId, minutes: u32) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| &t.id == id) else {
            return false;
        };
        task.add_time_spent(minutes);
        self.save_tasks();
        true
    }

    /// Remove every completed task and the schedule slots that placed them
    pub fn clear_completed_tasks(&mut self) -> usize {
        let removed: HashSet<TaskId> = self
            .tasks
            .iter()
            .filter(|t| t.is_complete())
            .map(|t| t.id.clone())
            .collect();

        if removed.is_empty() {
            return 0;
        }

        self.tasks.retain(|t| !removed.contains(&t.id));
        self.schedule.retain(|item| match &item.task_id {
            Some(task_id) => !removed.contains(task_id),
            None => true,
        });

        self.save_tasks();
        self.save_schedule();
        self.observer
            .notice(&Notice::info(format!("PURGED {} RECORDS", removed.len())));
        removed.len()
    }

    /// Swap in a freshly generated schedule
    pub fn replace_schedule(&mut self, items: impl IntoIterator<Item = ScheduleDraft>) {
        self.schedule = items.into_iter().map(ScheduleDraft::into_item).collect();
        self.save_schedule();
    }

    /// Move a slot; out-of-range indices leave the schedule untouched
    pub fn reorder_schedule(&mut self, from: usize, to: usize) -> bool {
        if !move_item(&mut self.schedule, from, to) {
            debug!(from, to, len = self.schedule.len(), "Ignoring out-of-range reorder");
            return false;
        }
        self.save_schedule();
        true
    }

    /// Merge profile fields and persist the whole profile
    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<()> {
        update.validate()?;
        if let Some(theme) = update.apply(&mut self.profile) {
            self.observer.theme_changed(theme);
        }
        self.save_profile();
        Ok(())
    }

    /// Count today's visit towards the streak
    pub fn register_login(&mut self, today: NaiveDate) -> StreakChange {
        let before = self.profile.last_login_date;
        let change = self.profile.register_login(today);
        if change != StreakChange::Unchanged || before != today {
            self.save_profile();
        }
        change
    }

    /// Record the end of a focus session on a task
    ///
    /// Completing marks the task done (if it is not already) and logs the
    /// minutes. Leaving early only logs the minutes.
    pub fn apply_focus_outcome(
        &mut self,
        id: &TaskId,
        outcome: FocusOutcome,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(task) = self.task(id) else {
            return false;
        };
        let already_done = task.is_complete();

        match outcome {
            FocusOutcome::Completed(minutes) => {
                if !already_done {
                    self.toggle_task_completion(id, now);
                }
                self.log_time_spent(id, minutes);
            }
            FocusOutcome::Abandoned(minutes) => {
                self.log_time_spent(id, minutes);
                if minutes > 0 {
                    self.observer
                        .notice(&Notice::info(format!("LOGGED {}M WORK", minutes)));
                }
            }
        }
        true
    }

    /// Save a template; returns its ID, None for an empty title
    pub fn save_template(&mut self, draft: &TaskDraft) -> Option<String> {
        draft.clean_title()?;
        let template = TaskTemplate::from_draft(draft);
        let id = template.id.clone();
        self.templates.push(template);
        self.save_templates();
        Some(id)
    }

    pub fn remove_template(&mut self, id: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.id != id);
        if self.templates.len() == before {
            return false;
        }
        self.save_templates();
        true
    }

    /// Create a task from a saved template
    pub fn add_task_from_template(&mut self, id: &str) -> Option<TaskId> {
        let draft = self.templates.iter().find(|t| t.id == id)?.to_draft();
        self.add_task(draft)
    }

    /// Tell the observer about something the store itself did not do
    pub fn notify(&mut self, notice: Notice) {
        self.observer.notice(&notice);
    }

    fn save_tasks(&mut self) {
        write_value(&mut self.backend, StorageKey::Tasks, &self.tasks);
    }

    fn save_schedule(&mut self) {
        write_value(&mut self.backend, StorageKey::Schedule, &self.schedule);
    }

    fn save_profile(&mut self) {
        write_value(&mut self.backend, StorageKey::Profile, &self.profile);
    }

    fn save_templates(&mut self) {
        write_value(&mut self.backend, StorageKey::Templates, &self.templates);
    }
}

fn load_value<B: StorageBackend, T: DeserializeOwned>(backend: &B, key: StorageKey) -> Option<T> {
    let raw = match backend.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read stored data, using defaults");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "Stored data is malformed, using defaults");
            None
        }
    }
}

fn write_value<B: StorageBackend, T: Serialize + ?Sized>(backend: &mut B, key: StorageKey, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to serialize state");
            return;
        }
    };

    if let Err(e) = backend.write(key, &json) {
        warn!(key = %key, error = %e, "Failed to persist state, keeping it in memory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::ScheduleDraft;
    use crate::task::{EnergyLevel, Priority, TaskCategory};
    use chrono::TimeZone;

    #[derive(Default)]
    struct RecordingObserver {
        notices: Vec<Notice>,
        themes: Vec<Theme>,
    }

    impl StoreObserver for RecordingObserver {
        fn notice(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }

        fn theme_changed(&mut self, theme: Theme) {
            self.themes.push(theme);
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 15, 0, 0).unwrap()
    }

    fn store() -> Store<MemoryBackend, RecordingObserver> {
        Store::load(MemoryBackend::new(), RecordingObserver::default())
    }

    fn report() -> TaskDraft {
        TaskDraft::new("Write report")
            .with_duration(60)
            .with_priority(Priority::High)
            .with_category(TaskCategory::Work)
            .with_energy(EnergyLevel::High)
    }

    fn slot_for(id: &TaskId, title: &str) -> ScheduleDraft {
        ScheduleDraft::new("09:00 - 10:00", title).for_task(id.clone(), TaskCategory::Work)
    }

    #[test]
    fn test_add_task() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();

        let task = store.task(&id).unwrap();
        assert!(!task.is_complete());
        assert_eq!(task.time_spent, Some(0));
        assert!(store.backend().get(StorageKey::Tasks).unwrap().contains("Write report"));
        assert_eq!(store.observer().notices, vec![Notice::success("NEW QUEST ACQUIRED")]);
    }

    #[test]
    fn test_add_task_rejects_blank_title() {
        let mut store = store();
        assert!(store.add_task(TaskDraft::new("   ")).is_none());
        assert!(store.tasks().is_empty());
        assert!(store.observer().notices.is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_state_and_aura() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();
        let before = store.task(&id).unwrap().clone();

        assert_eq!(store.toggle_task_completion(&id, now()), Some(true));
        assert_eq!(store.profile().aura, 100);
        assert_eq!(store.task(&id).unwrap().completed_at(), Some(now()));

        assert_eq!(store.toggle_task_completion(&id, now()), Some(false));
        assert_eq!(store.profile().aura, 0);
        assert_eq!(store.task(&id).unwrap(), &before);
    }

    #[test]
    fn test_uncomplete_floors_aura_at_zero() {
        let done = Task::from_draft(report()).with_completed_at(now()).with_id("done");
        let backend = MemoryBackend::new()
            .with_value(StorageKey::Tasks, serde_json::to_string(&vec![done]).unwrap());
        let mut store = Store::load(backend, RecordingObserver::default());

        assert_eq!(store.toggle_task_completion(&TaskId::from("done"), now()), Some(false));
        assert_eq!(store.profile().aura, 0);
    }

    #[test]
    fn test_toggle_unknown_id_is_a_miss() {
        let mut store = store();
        assert_eq!(store.toggle_task_completion(&TaskId::from("nope"), now()), None);
        assert_eq!(store.profile().aura, 0);
    }

    #[test]
    fn test_completion_invariant_holds() {
        let mut store = store();
        let a = store.add_task(TaskDraft::new("a")).unwrap();
        store.add_task(TaskDraft::new("b"));
        store.toggle_task_completion(&a, now());

        for task in store.tasks() {
            assert_eq!(task.is_complete(), task.completed_at().is_some());
        }
    }

    #[test]
    fn test_delete_cascades_to_schedule() {
        let mut store = store();
        let keep = store.add_task(TaskDraft::new("keep")).unwrap();
        let drop = store.add_task(TaskDraft::new("drop")).unwrap();
        store.replace_schedule(vec![
            slot_for(&drop, "drop"),
            slot_for(&keep, "keep"),
            ScheduleDraft::new("10:00 - 10:10", "Vibe Check").as_break(),
            slot_for(&drop, "drop again"),
        ]);

        let removed = store.delete_task(&drop).unwrap();
        assert_eq!(removed.title, "drop");

        let titles: Vec<&str> = store.schedule().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["keep", "Vibe Check"]);
        assert!(store.delete_task(&drop).is_none());
    }

    #[test]
    fn test_edit_cascades_title_and_category() {
        let mut store = store();
        let id = store.add_task(TaskDraft::new("draft")).unwrap();
        store.replace_schedule(vec![slot_for(&id, "draft")]);

        let edited = TaskDraft::new("Gym")
            .with_category(TaskCategory::Health)
            .with_duration(90);
        assert!(store.edit_task(&id, edited));

        let task = store.task(&id).unwrap();
        assert_eq!(task.title, "Gym");
        assert_eq!(task.duration_minutes, 90);
        assert_eq!(store.schedule()[0].title, "Gym");
        assert_eq!(store.schedule()[0].category, TaskCategory::Health);
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        let mut store = store();
        assert!(!store.edit_task(&TaskId::from("ghost"), TaskDraft::new("x")));
        assert!(store.observer().notices.is_empty());
    }

    #[test]
    fn test_log_time_spent() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();

        assert!(store.log_time_spent(&id, 20));
        assert!(store.log_time_spent(&id, 0));
        assert!(store.log_time_spent(&id, 25));
        assert_eq!(store.task(&id).unwrap().time_spent, Some(45));
        assert!(!store.log_time_spent(&TaskId::from("ghost"), 5));
    }

    #[test]
    fn test_clear_completed_prunes_schedule() {
        let mut store = store();
        let done = store.add_task(TaskDraft::new("done")).unwrap();
        let open = store.add_task(TaskDraft::new("open")).unwrap();
        store.replace_schedule(vec![slot_for(&done, "done"), slot_for(&open, "open")]);
        store.toggle_task_completion(&done, now());

        assert_eq!(store.clear_completed_tasks(), 1);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.schedule().len(), 1);
        assert!(store.schedule()[0].references(&open));
        assert_eq!(store.clear_completed_tasks(), 0);
    }

    #[test]
    fn test_replace_schedule_assigns_ids() {
        let mut store = store();
        store.replace_schedule(vec![
            ScheduleDraft::new("09:00 - 10:00", "one"),
            ScheduleDraft::new("10:00 - 11:00", "two"),
        ]);

        let ids: HashSet<&str> = store.schedule().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(store.backend().get(StorageKey::Schedule).unwrap().contains("two"));
    }

    #[test]
    fn test_reorder_schedule() {
        let mut store = store();
        store.replace_schedule(vec![
            ScheduleDraft::new("09:00 - 10:00", "A"),
            ScheduleDraft::new("10:00 - 11:00", "B"),
            ScheduleDraft::new("11:00 - 12:00", "C"),
        ]);

        assert!(store.reorder_schedule(0, 2));
        let titles: Vec<&str> = store.schedule().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["B", "C", "A"]);

        assert!(!store.reorder_schedule(5, 0));
    }

    #[test]
    fn test_theme_change_notifies_observer() {
        let mut store = store();
        store.update_profile(ProfileUpdate::new().theme(Theme::Goth)).unwrap();
        store.update_profile(ProfileUpdate::new().name("Robin")).unwrap();

        assert_eq!(store.observer().themes, vec![Theme::Cyber, Theme::Goth]);
        assert_eq!(store.profile().name, "Robin");
        assert!(store.backend().get(StorageKey::Profile).unwrap().contains("Robin"));
    }

    #[test]
    fn test_update_profile_rejects_bad_clock() {
        let mut store = store();
        assert!(store.update_profile(ProfileUpdate::new().wake_up_time("7am")).is_err());
        assert_eq!(store.profile().wake_up_time, "07:00");
    }

    #[test]
    fn test_first_run_persists_default_profile() {
        let store = store();
        assert!(store.backend().get(StorageKey::Profile).is_some());
    }

    #[test]
    fn test_unavailable_storage_keeps_memory_state() {
        let mut store = Store::load(MemoryBackend::unavailable(), SilentObserver);
        let id = store.add_task(report()).unwrap();
        store.toggle_task_completion(&id, now());

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.profile().aura, 100);
    }

    #[test]
    fn test_malformed_collection_falls_back_alone() {
        let good = serde_json::to_string(&vec![Task::from_draft(report())]).unwrap();
        let backend = MemoryBackend::new()
            .with_value(StorageKey::Tasks, good)
            .with_value(StorageKey::Schedule, "{not json")
            .with_value(StorageKey::Profile, r#"{"name":"Kai","streak":3}"#);

        let store = Store::load(backend, SilentObserver);
        assert_eq!(store.tasks().len(), 1);
        assert!(store.schedule().is_empty());
        assert_eq!(store.profile().name, "Kai");
        assert_eq!(store.profile().streak, 3);
        assert_eq!(store.profile().sleep_time, "23:00");
    }

    #[test]
    fn test_load_repairs_completion_state() {
        let mut stale = serde_json::to_value(Task::from_draft(report()).with_id("stale")).unwrap();
        stale["completed"] = serde_json::Value::Bool(true);
        let done = Task::from_draft(report()).with_completed_at(now()).with_id("done");
        let raw = serde_json::to_string(&serde_json::json!([stale, done])).unwrap();

        let store = Store::load(
            MemoryBackend::new().with_value(StorageKey::Tasks, raw),
            SilentObserver,
        );
        assert!(!store.task(&TaskId::from("stale")).unwrap().is_complete());
        assert!(store.task(&TaskId::from("done")).unwrap().is_complete());
        assert_eq!(store.completed_count(), 1);
    }

    #[test]
    fn test_write_report_scenario() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();
        let aura_before = store.profile().aura;

        store.toggle_task_completion(&id, now());
        assert_eq!(store.profile().aura, aura_before + 100);

        assert_eq!(store.clear_completed_tasks(), 1);
        assert!(store.task(&id).is_none());
    }

    #[test]
    fn test_resolve_task_by_prefix() {
        let mut store = store();
        let id = store.add_task(TaskDraft::new("one")).unwrap();

        assert_eq!(store.resolve_task(id.as_str()).unwrap(), id);
        assert_eq!(store.resolve_task(id.short()).unwrap(), id);
        assert!(matches!(store.resolve_task("zzzz-none"), Err(CoreError::TaskNotFound(_))));
        assert!(store.resolve_task("").is_err());
    }

    #[test]
    fn test_focus_completed_marks_done_once() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();

        store.apply_focus_outcome(&id, FocusOutcome::Completed(30), now());
        store.apply_focus_outcome(&id, FocusOutcome::Completed(5), now());

        let task = store.task(&id).unwrap();
        assert!(task.is_complete());
        assert_eq!(task.time_spent, Some(35));
        assert_eq!(store.profile().aura, 100);
    }

    #[test]
    fn test_focus_abandoned_only_logs_time() {
        let mut store = store();
        let id = store.add_task(report()).unwrap();

        store.apply_focus_outcome(&id, FocusOutcome::Abandoned(12), now());

        let task = store.task(&id).unwrap();
        assert!(!task.is_complete());
        assert_eq!(task.time_spent, Some(12));
        assert_eq!(
            store.observer().notices.last(),
            Some(&Notice::info("LOGGED 12M WORK"))
        );
    }

    #[test]
    fn test_templates() {
        let mut store = store();
        let template_id = store.save_template(&report()).unwrap();
        assert!(store.save_template(&TaskDraft::new("")).is_none());

        let task_id = store.add_task_from_template(&template_id).unwrap();
        assert_eq!(store.task(&task_id).unwrap().duration_minutes, 60);

        assert!(store.remove_template(&template_id));
        assert!(!store.remove_template(&template_id));
        assert!(store.templates().is_empty());
    }

    #[test]
    fn test_add_tasks_batch() {
        let mut store = store();
        let ids = store.add_tasks(vec![TaskDraft::new("a"), TaskDraft::new(" "), TaskDraft::new("b")]);

        assert_eq!(ids.len(), 2);
        assert_eq!(store.observer().notices, vec![Notice::success("EXTRACTED 2 TASKS")]);
    }

    #[test]
    fn test_register_login_persists_streak() {
        let mut store = store();
        let yesterday = store.profile().last_login_date;
        let today = yesterday.succ_opt().unwrap();

        assert_eq!(store.register_login(today), StreakChange::Extended);
        assert_eq!(store.profile().streak, 1);
        assert!(store.backend().get(StorageKey::Profile).unwrap().contains("\"streak\":1"));
    }
}
