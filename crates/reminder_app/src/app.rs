use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use reminder_core::{
    config::parse_flag,
    location::{LocationAuthorizationStatus, LocationPermission},
    memory::{InMemoryNotificationSink, InMemoryTaskStore},
    notifications::PendingRequest,
    LocationRegion, Reminder, ReminderScheduler, ScheduleOutcome, SchedulerConfig, Task,
    Unschedulable,
};
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) tasks_file: Option<PathBuf>,
    pub(crate) location_status: LocationAuthorizationStatus,
    pub(crate) grant_notifications: bool,
    pub(crate) scheduler: SchedulerConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            scheduler: SchedulerConfig::from_env()?,
            ..Self::default()
        };
        if let Ok(path) = std::env::var("REMINDER_TASKS_FILE") {
            config.tasks_file = Some(PathBuf::from(path));
        }
        if let Ok(status) = std::env::var("REMINDER_LOCATION_AUTH") {
            config.location_status = status.parse()?;
        }
        if let Ok(flag) = std::env::var("REMINDER_GRANT_NOTIFICATIONS") {
            config.grant_notifications = parse_flag(&flag)
                .with_context(|| format!("REMINDER_GRANT_NOTIFICATIONS=`{flag}`"))?;
        }
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tasks_file: None,
            location_status: LocationAuthorizationStatus::NotDetermined,
            grant_notifications: true,
            scheduler: SchedulerConfig::default(),
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    pub pending: Vec<PendingRequest>,
    pub skipped: Vec<(String, Unschedulable)>,
}

pub fn load_tasks(path: &Path) -> Result<Vec<Task>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading tasks from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing tasks in {}", path.display()))
}

fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("Stand up and stretch", Reminder::after_seconds(1800.0, true)),
        Task::new("Call Mom", Reminder::after_seconds(3600.0, false)),
        Task::new(
            "Buy milk",
            Reminder::near(
                LocationRegion {
                    latitude: 40.7128,
                    longitude: -74.006,
                    radius_meters: 150.0,
                },
                false,
            ),
        ),
    ]
}

/// Schedules every task against an in-memory notification service and reports what is pending.
pub fn run(config: AppConfig) -> Result<RunReport> {
    let tasks = match &config.tasks_file {
        Some(path) => load_tasks(path)?,
        None => sample_tasks(),
    };

    let sink = Arc::new(InMemoryNotificationSink::new().granting(config.grant_notifications));
    let store = Arc::new(InMemoryTaskStore::new());
    let scheduler = ReminderScheduler::builder()
        .with_notification_sink(sink.clone())
        .with_task_store(store.clone())
        .with_location_authorization(Arc::new(LocationPermission::new(config.location_status)))
        .with_config(config.scheduler)
        .build()?;

    scheduler.register_categories();
    scheduler.request_authorization(|granted| {
        if !granted {
            warn!("notifications not authorized; reminders will not be shown");
        }
    });

    let mut skipped = Vec::new();
    for task in tasks {
        store.add(task.clone());
        match scheduler.schedule(&task) {
            ScheduleOutcome::Submitted => info!(task_id = %task.id, name = %task.name, "reminder submitted"),
            ScheduleOutcome::Skipped(reason) => {
                info!(task_id = %task.id, %reason, "reminder skipped");
                skipped.push((task.id, reason));
            }
        }
    }

    Ok(RunReport {
        pending: sink.pending(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn sample_run_skips_location_without_permission() {
        let report = run(AppConfig::default()).expect("run");
        assert_eq!(report.pending.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].1, Unschedulable::PermissionDenied);
    }

    #[test]
    fn tasks_file_is_loaded_and_scheduled() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("tasks.json");
        fs::write(
            &path,
            r#"[
                {"id": "t1", "name": "Call Mom", "reminder": {"type": "time_delay", "interval_seconds": 3600}},
                {"id": "t2", "name": "Dentist", "reminder": {"type": "calendar_moment", "date": "2025-11-07T10:30:45", "repeats": true}},
                {"id": "t3", "name": "Broken", "reminder": {"type": "time_delay"}}
            ]"#,
        )
        .expect("write fixture");

        let config = AppConfig {
            tasks_file: Some(path),
            ..AppConfig::default()
        };
        let report = run(config).expect("run");
        let ids: Vec<&str> = report.pending.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, ["t1", "t2"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "t3");
    }

    #[test]
    fn unreadable_tasks_file_is_an_error() {
        let config = AppConfig {
            tasks_file: Some(PathBuf::from("/definitely/not/here.json")),
            ..AppConfig::default()
        };
        let err = run(config).unwrap_err();
        assert!(format!("{err:#}").contains("reading tasks"));
    }
}
