use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit of work owned by the caller's task store. The scheduler only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    pub reminder: Reminder,
}

impl Task {
    /// Creates a task with a fresh identifier. The identifier never changes afterwards
    /// and doubles as the notification and geofence identifier.
    pub fn new(name: impl Into<String>, reminder: Reminder) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, reminder)
    }

    pub fn with_id(id: impl Into<String>, name: impl Into<String>, reminder: Reminder) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            completed: false,
            reminder,
        }
    }
}

/// When a task should remind its owner. Each variant carries only the data valid for
/// its kind; the data itself stays optional because tasks arrive from external stores
/// and payloads where it can be absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reminder {
    TimeDelay {
        interval_seconds: Option<f64>,
        #[serde(default)]
        repeats: bool,
    },
    CalendarMoment {
        date: Option<NaiveDateTime>,
        #[serde(default)]
        repeats: bool,
    },
    Location {
        location: Option<LocationRegion>,
        #[serde(default)]
        repeats: bool,
    },
}

impl Reminder {
    pub fn after_seconds(interval_seconds: f64, repeats: bool) -> Self {
        Reminder::TimeDelay {
            interval_seconds: Some(interval_seconds),
            repeats,
        }
    }

    pub fn at(date: NaiveDateTime, repeats: bool) -> Self {
        Reminder::CalendarMoment {
            date: Some(date),
            repeats,
        }
    }

    pub fn near(location: LocationRegion, repeats: bool) -> Self {
        Reminder::Location {
            location: Some(location),
            repeats,
        }
    }

    pub fn kind(&self) -> ReminderKind {
        match self {
            Reminder::TimeDelay { .. } => ReminderKind::Time,
            Reminder::CalendarMoment { .. } => ReminderKind::Calendar,
            Reminder::Location { .. } => ReminderKind::Location,
        }
    }

    pub fn repeats(&self) -> bool {
        match self {
            Reminder::TimeDelay { repeats, .. }
            | Reminder::CalendarMoment { repeats, .. }
            | Reminder::Location { repeats, .. } => *repeats,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    Time,
    Calendar,
    Location,
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReminderKind::Time => "time",
            ReminderKind::Calendar => "calendar",
            ReminderKind::Location => "location",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_tasks_get_distinct_identifiers() {
        let a = Task::new("Water plants", Reminder::after_seconds(60.0, false));
        let b = Task::new("Water plants", Reminder::after_seconds(60.0, false));
        assert_ne!(a.id, b.id);
        assert!(!a.completed);
    }

    #[test]
    fn reminder_json_is_tagged_by_kind() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let task = Task::with_id("t9", "Dentist", Reminder::at(date, false));
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["reminder"]["type"], "calendar_moment");
        assert_eq!(json["reminder"]["date"], "2025-03-14T09:30:00");
    }

    #[test]
    fn missing_reminder_data_still_deserializes() {
        let raw = r#"{"id":"t3","name":"Gym","reminder":{"type":"time_delay"}}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(
            task.reminder,
            Reminder::TimeDelay {
                interval_seconds: None,
                repeats: false
            }
        );
        assert_eq!(task.reminder.kind(), ReminderKind::Time);
    }
}
