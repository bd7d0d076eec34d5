use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PayloadError, SubmissionError};
use crate::task::Task;
use crate::trigger::NotificationTrigger;

pub const REMINDER_CATEGORY_ID: &str = "OrganizerPlusCategory";
pub const DISMISS_ACTION_ID: &str = "dismiss";
pub const MARK_AS_DONE_ACTION_ID: &str = "markAsDone";
/// Metadata key under which the serialized task travels with its notification.
pub const TASK_PAYLOAD_KEY: &str = "Task";

/// Callback invoked by a sink once an asynchronous operation settles.
pub type Completion<T> = Box<dyn FnOnce(T) + Send + 'static>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub category_identifier: String,
    pub thread_identifier: Option<String>,
    pub user_info: BTreeMap<String, String>,
}

impl NotificationContent {
    pub fn attach_task(&mut self, task: &Task) -> Result<(), serde_json::Error> {
        let encoded = serde_json::to_string(task)?;
        self.user_info.insert(TASK_PAYLOAD_KEY.to_string(), encoded);
        Ok(())
    }

    pub fn embedded_task(&self) -> Result<Task, PayloadError> {
        let raw = self
            .user_info
            .get(TASK_PAYLOAD_KEY)
            .ok_or(PayloadError::Missing)?;
        Ok(serde_json::from_str(raw)?)
    }
}

/// A submitted notification, owned by the sink and keyed by `identifier`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRequest {
    pub identifier: String,
    pub content: NotificationContent,
    pub trigger: NotificationTrigger,
}

/// A notification that has fired.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveredNotification {
    pub request: PendingRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResponse {
    pub action_identifier: String,
    pub notification: DeliveredNotification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationOption {
    Banner,
    List,
    Sound,
    Badge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationAction {
    pub identifier: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationCategory {
    pub identifier: String,
    pub actions: Vec<NotificationAction>,
}

impl NotificationCategory {
    /// The single actionable category every reminder is posted under.
    pub fn reminder() -> Self {
        Self {
            identifier: REMINDER_CATEGORY_ID.to_string(),
            actions: vec![
                NotificationAction {
                    identifier: DISMISS_ACTION_ID.to_string(),
                    title: "Dismiss".to_string(),
                },
                NotificationAction {
                    identifier: MARK_AS_DONE_ACTION_ID.to_string(),
                    title: "Mark As Done".to_string(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationOptions {
    pub alert: bool,
    pub sound: bool,
    pub badge: bool,
}

impl AuthorizationOptions {
    pub fn all() -> Self {
        Self {
            alert: true,
            sound: true,
            badge: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthorizationStatus {
    #[default]
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    pub authorization_status: AuthorizationStatus,
    pub alert_enabled: bool,
    pub sound_enabled: bool,
    pub badge_enabled: bool,
}

/// Platform-specific notification services implement this trait.
///
/// Every method returns immediately; results arrive through the completion, which may
/// run on any thread. Requests are keyed by identifier: adding a request whose
/// identifier is already pending replaces it.
pub trait NotificationSink: Send + Sync {
    fn request_authorization(&self, options: AuthorizationOptions, completion: Completion<bool>);
    fn fetch_settings(&self, completion: Completion<NotificationSettings>);
    fn add(&self, request: PendingRequest, completion: Completion<Result<(), SubmissionError>>);
    fn remove_pending(&self, identifiers: &[String]);
    fn set_categories(&self, categories: Vec<NotificationCategory>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Reminder;

    #[test]
    fn task_payload_survives_content_round_trip() {
        let task = Task::with_id("t1", "Call Mom", Reminder::after_seconds(3600.0, false));
        let mut content = NotificationContent::default();
        content.attach_task(&task).unwrap();
        assert!(content.user_info.contains_key(TASK_PAYLOAD_KEY));
        assert_eq!(content.embedded_task().unwrap(), task);
    }

    #[test]
    fn missing_or_corrupt_payload_fails_to_decode() {
        let mut content = NotificationContent::default();
        assert!(matches!(content.embedded_task(), Err(PayloadError::Missing)));

        content
            .user_info
            .insert(TASK_PAYLOAD_KEY.to_string(), "{not json".to_string());
        assert!(matches!(content.embedded_task(), Err(PayloadError::Decode(_))));
    }

    #[test]
    fn reminder_category_has_dismiss_and_mark_done() {
        let category = NotificationCategory::reminder();
        let ids: Vec<&str> = category
            .actions
            .iter()
            .map(|action| action.identifier.as_str())
            .collect();
        assert_eq!(category.identifier, "OrganizerPlusCategory");
        assert_eq!(ids, ["dismiss", "markAsDone"]);
    }
}
