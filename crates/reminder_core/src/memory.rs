//! In-process implementations of the sink and task store, used by the demo binary and tests.

use std::collections::BTreeMap;

use parking_lot::{Mutex, RwLock};

use crate::{
    actions::TaskStore,
    error::SubmissionError,
    notifications::{
        AuthorizationOptions, AuthorizationStatus, Completion, DeliveredNotification,
        NotificationCategory, NotificationSettings, NotificationSink, PendingRequest,
    },
    task::Task,
};

/// Keeps pending requests in a map keyed by identifier, the way the platform does.
/// Completions run synchronously on the calling thread, after the internal lock is released.
pub struct InMemoryNotificationSink {
    state: Mutex<SinkState>,
    grant_authorization: bool,
    pending_limit: Option<usize>,
}

#[derive(Default)]
struct SinkState {
    pending: BTreeMap<String, PendingRequest>,
    categories: Vec<NotificationCategory>,
    settings: NotificationSettings,
}

impl InMemoryNotificationSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SinkState::default()),
            grant_authorization: true,
            pending_limit: None,
        }
    }

    /// Answer given to every authorization request.
    pub fn granting(mut self, granted: bool) -> Self {
        self.grant_authorization = granted;
        self
    }

    /// Rejects new identifiers once this many requests are pending.
    pub fn with_pending_limit(mut self, limit: usize) -> Self {
        self.pending_limit = Some(limit);
        self
    }

    pub fn pending(&self) -> Vec<PendingRequest> {
        self.state.lock().pending.values().cloned().collect()
    }

    pub fn pending_request(&self, identifier: &str) -> Option<PendingRequest> {
        self.state.lock().pending.get(identifier).cloned()
    }

    pub fn categories(&self) -> Vec<NotificationCategory> {
        self.state.lock().categories.clone()
    }

    /// Fires the request pending under `identifier`. One-shot requests are consumed;
    /// repeating ones stay pending.
    pub fn deliver(&self, identifier: &str) -> Option<DeliveredNotification> {
        let mut state = self.state.lock();
        let request = state.pending.get(identifier)?.clone();
        if !request.trigger.repeats() {
            state.pending.remove(identifier);
        }
        Some(DeliveredNotification { request })
    }
}

impl Default for InMemoryNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for InMemoryNotificationSink {
    fn request_authorization(&self, options: AuthorizationOptions, completion: Completion<bool>) {
        let granted = self.grant_authorization;
        {
            let mut state = self.state.lock();
            state.settings = if granted {
                NotificationSettings {
                    authorization_status: AuthorizationStatus::Authorized,
                    alert_enabled: options.alert,
                    sound_enabled: options.sound,
                    badge_enabled: options.badge,
                }
            } else {
                NotificationSettings {
                    authorization_status: AuthorizationStatus::Denied,
                    ..NotificationSettings::default()
                }
            };
        }
        completion(granted);
    }

    fn fetch_settings(&self, completion: Completion<NotificationSettings>) {
        let settings = self.state.lock().settings.clone();
        completion(settings);
    }

    fn add(&self, request: PendingRequest, completion: Completion<Result<(), SubmissionError>>) {
        let result = {
            let mut state = self.state.lock();
            let replacing = state.pending.contains_key(&request.identifier);
            match self.pending_limit {
                Some(limit) if !replacing && state.pending.len() >= limit => {
                    Err(SubmissionError::LimitReached { limit })
                }
                _ => {
                    state.pending.insert(request.identifier.clone(), request);
                    Ok(())
                }
            }
        };
        completion(result);
    }

    fn remove_pending(&self, identifiers: &[String]) {
        let mut state = self.state.lock();
        for identifier in identifiers {
            state.pending.remove(identifier);
        }
    }

    fn set_categories(&self, categories: Vec<NotificationCategory>) {
        self.state.lock().categories = categories;
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `task`, replacing any task with the same id.
    pub fn add(&self, task: Task) {
        let mut tasks = self.tasks.write();
        match tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => tasks.push(task),
        }
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.tasks.read().iter().find(|task| task.id == id).cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().clone()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn remove(&self, task: &Task) {
        self.tasks.write().retain(|existing| existing.id != task.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationContent;
    use crate::trigger::NotificationTrigger;
    use std::sync::mpsc::{self, Sender};
    use std::time::Duration;

    fn request(id: &str, repeats: bool) -> PendingRequest {
        PendingRequest {
            identifier: id.to_string(),
            content: NotificationContent::default(),
            trigger: NotificationTrigger::TimeInterval {
                interval: Duration::from_secs(60),
                repeats,
            },
        }
    }

    fn reporting(tx: &Sender<Result<(), SubmissionError>>) -> Completion<Result<(), SubmissionError>> {
        let tx = tx.clone();
        Box::new(move |result| {
            let _ = tx.send(result);
        })
    }

    #[test]
    fn limit_rejects_new_identifiers_but_allows_replacement() {
        let sink = InMemoryNotificationSink::new().with_pending_limit(1);
        let (tx, rx) = mpsc::channel();

        sink.add(request("a", false), reporting(&tx));
        sink.add(request("b", false), reporting(&tx));
        sink.add(request("a", true), reporting(&tx));

        let results: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            results,
            vec![
                Ok(()),
                Err(SubmissionError::LimitReached { limit: 1 }),
                Ok(())
            ]
        );
        assert_eq!(sink.pending().len(), 1);
        assert!(sink.pending_request("a").unwrap().trigger.repeats());
    }

    #[test]
    fn delivery_consumes_one_shot_requests_only() {
        let sink = InMemoryNotificationSink::new();
        sink.add(request("once", false), Box::new(|_| {}));
        sink.add(request("again", true), Box::new(|_| {}));

        assert!(sink.deliver("once").is_some());
        assert!(sink.deliver("again").is_some());
        assert!(sink.pending_request("once").is_none());
        assert!(sink.pending_request("again").is_some());
        assert!(sink.deliver("missing").is_none());
    }

    #[test]
    fn task_store_replaces_and_removes_by_id() {
        use crate::task::Reminder;
        let store = InMemoryTaskStore::new();
        store.add(Task::with_id("t1", "Old", Reminder::after_seconds(1.0, false)));
        store.add(Task::with_id("t1", "New", Reminder::after_seconds(1.0, false)));
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.get("t1").unwrap().name, "New");

        let task = store.get("t1").unwrap();
        store.remove(&task);
        assert!(store.tasks().is_empty());
    }
}
