use thiserror::Error;

use crate::task::ReminderKind;

/// Why a reminder cannot be turned into a trigger right now. None of these are
/// failures of the scheduler; the reminder is simply skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Unschedulable {
    #[error("{kind} reminder is missing its trigger data")]
    MissingData { kind: ReminderKind },

    #[error("location reminders need when-in-use location authorization")]
    PermissionDenied,

    #[error("time interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),

    #[error("invalid region: {reason}")]
    InvalidRegion { reason: String },
}

/// The notification service refused a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("pending notification limit of {limit} reached")]
    LimitReached { limit: usize },

    #[error("notification service rejected request: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("notification carries no task payload")]
    Missing,

    #[error("task payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}
