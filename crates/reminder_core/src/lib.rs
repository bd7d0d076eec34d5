pub mod actions;
pub mod config;
pub mod error;
pub mod location;
pub mod memory;
pub mod notifications;
pub mod scheduler;
pub mod settings;
pub mod task;
pub mod trigger;

pub use crate::actions::{ResponseOutcome, TaskStore};
pub use crate::config::SchedulerConfig;
pub use crate::error::{PayloadError, SubmissionError, Unschedulable};
pub use crate::scheduler::{ReminderScheduler, ReminderSchedulerBuilder, ScheduleOutcome};
pub use crate::task::{LocationRegion, Reminder, ReminderKind, Task};
