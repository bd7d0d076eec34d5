use std::time::Duration;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::Unschedulable;
use crate::task::{LocationRegion, Reminder, ReminderKind};

pub const TIME_BASED_THREAD_ID: &str = "TimeBasedNotificationThreadId";
pub const CALENDAR_BASED_THREAD_ID: &str = "CalendarBasedNotificationThreadId";
pub const LOCATION_BASED_THREAD_ID: &str = "LocationBasedNotificationThreadId";

/// Presentation grouping for delivered notifications. Has no effect on when they fire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ThreadGroup {
    TimeBased,
    CalendarBased,
    LocationBased,
}

impl ThreadGroup {
    pub fn for_kind(kind: ReminderKind) -> Self {
        match kind {
            ReminderKind::Time => ThreadGroup::TimeBased,
            ReminderKind::Calendar => ThreadGroup::CalendarBased,
            ReminderKind::Location => ThreadGroup::LocationBased,
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            ThreadGroup::TimeBased => TIME_BASED_THREAD_ID,
            ThreadGroup::CalendarBased => CALENDAR_BASED_THREAD_ID,
            ThreadGroup::LocationBased => LOCATION_BASED_THREAD_ID,
        }
    }
}

/// Calendar fields a calendar trigger matches on. No seconds: it fires on the minute boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DateComponents {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub hour: u32,
    pub minute: u32,
}

impl DateComponents {
    pub fn from_datetime(date: &NaiveDateTime) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
            hour: date.hour(),
            minute: date.minute(),
        }
    }

    /// The first instant matching these components, or `None` if they do not name a real date.
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, 0)
    }
}

/// Geofence handed to the platform. `identifier` is always the owning task's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CircularRegion {
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationTrigger {
    TimeInterval { interval: Duration, repeats: bool },
    Calendar { components: DateComponents, repeats: bool },
    Location { region: CircularRegion, repeats: bool },
}

impl NotificationTrigger {
    pub fn repeats(&self) -> bool {
        match self {
            NotificationTrigger::TimeInterval { repeats, .. }
            | NotificationTrigger::Calendar { repeats, .. }
            | NotificationTrigger::Location { repeats, .. } => *repeats,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDescriptor {
    pub trigger: NotificationTrigger,
    pub thread_group: ThreadGroup,
}

/// Turns a reminder into a concrete trigger, or explains why it cannot be scheduled.
///
/// Pure classification: no side effects and no retries. For location reminders the
/// permission check runs before any look at the location data.
pub fn resolve(
    task_id: &str,
    reminder: &Reminder,
    location_permission_granted: bool,
) -> Result<TriggerDescriptor, Unschedulable> {
    let kind = reminder.kind();
    let trigger = match reminder {
        Reminder::TimeDelay {
            interval_seconds,
            repeats,
        } => {
            let seconds = interval_seconds.ok_or(Unschedulable::MissingData { kind })?;
            NotificationTrigger::TimeInterval {
                interval: positive_interval(seconds)?,
                repeats: *repeats,
            }
        }
        Reminder::CalendarMoment { date, repeats } => {
            let date = date.as_ref().ok_or(Unschedulable::MissingData { kind })?;
            NotificationTrigger::Calendar {
                components: DateComponents::from_datetime(date),
                repeats: *repeats,
            }
        }
        Reminder::Location { location, repeats } => {
            if !location_permission_granted {
                return Err(Unschedulable::PermissionDenied);
            }
            let location = location.as_ref().ok_or(Unschedulable::MissingData { kind })?;
            NotificationTrigger::Location {
                region: circular_region(task_id, location)?,
                repeats: *repeats,
            }
        }
    };
    Ok(TriggerDescriptor {
        trigger,
        thread_group: ThreadGroup::for_kind(kind),
    })
}

fn positive_interval(seconds: f64) -> Result<Duration, Unschedulable> {
    if !(seconds.is_finite() && seconds > 0.0) {
        return Err(Unschedulable::InvalidInterval(seconds));
    }
    match Duration::try_from_secs_f64(seconds) {
        // Sub-nanosecond inputs round down to zero.
        Ok(interval) if !interval.is_zero() => Ok(interval),
        _ => Err(Unschedulable::InvalidInterval(seconds)),
    }
}

fn circular_region(task_id: &str, location: &LocationRegion) -> Result<CircularRegion, Unschedulable> {
    if !(-90.0..=90.0).contains(&location.latitude) {
        return Err(Unschedulable::InvalidRegion {
            reason: format!("latitude {} out of range", location.latitude),
        });
    }
    if !(-180.0..=180.0).contains(&location.longitude) {
        return Err(Unschedulable::InvalidRegion {
            reason: format!("longitude {} out of range", location.longitude),
        });
    }
    if !(location.radius_meters.is_finite() && location.radius_meters > 0.0) {
        return Err(Unschedulable::InvalidRegion {
            reason: format!("radius {} must be positive", location.radius_meters),
        });
    }
    Ok(CircularRegion {
        identifier: task_id.to_string(),
        latitude: location.latitude,
        longitude: location.longitude,
        radius_meters: location.radius_meters,
    })
}
