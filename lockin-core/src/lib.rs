//! LOCK IN Core - Pure domain logic for the task and schedule manager
//!
//! This crate contains no file or network I/O. Persistence goes through the
//! [`store::StorageBackend`] trait and AI calls through the
//! [`assistant::Assistant`] trait, both implemented by the front end.

pub mod analytics;
pub mod assistant;
pub mod calendar;
pub mod error;
pub mod filter;
pub mod profile;
pub mod schedule;
pub mod store;
pub mod task;
pub mod template;
pub mod timer;

pub use analytics::{AnalyticsReport, TimeRange, TrendPoint, WindowStats};
pub use assistant::{Assistant, BrainDump, Playlist, SubTaskCandidate};
pub use error::{CoreError, Result};
pub use filter::{HistoryFilter, HistorySort, SortOrder};
pub use profile::{PomodoroSettings, ProfileUpdate, StreakChange, Theme, UserProfile};
pub use schedule::{ScheduleDraft, ScheduleId, ScheduleItem, TimeSlot};
pub use store::{
    MemoryBackend, Notice, NoticeKind, SilentObserver, StorageBackend, StorageKey, Store,
    StoreObserver,
};
pub use task::{EnergyLevel, Priority, Task, TaskCategory, TaskDraft, TaskId};
pub use template::TaskTemplate;
pub use timer::{Countdown, FocusOutcome, Phase, PomodoroCycle};
