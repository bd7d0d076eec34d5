//! Owned cache of the notification service's settings.
//!
//! Sink callbacks may arrive on any thread. They never write the store themselves; the
//! new value is handed to a [`Dispatcher`], which runs the write on the context that
//! owns presentation state.

use std::sync::mpsc::{self, Receiver, Sender};

use parking_lot::{Mutex, RwLock};

use crate::notifications::NotificationSettings;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs jobs on whichever thread dispatches them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateDispatcher;

impl Dispatcher for ImmediateDispatcher {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Queues jobs until the owning thread drains them with [`MainQueue::run_pending`].
pub struct MainQueue {
    sender: Mutex<Sender<Job>>,
    receiver: Mutex<Receiver<Job>>,
}

impl MainQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
        }
    }

    /// Runs every queued job and returns how many ran.
    pub fn run_pending(&self) -> usize {
        let jobs: Vec<Job> = self.receiver.lock().try_iter().collect();
        let count = jobs.len();
        for job in jobs {
            job();
        }
        count
    }
}

impl Default for MainQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for MainQueue {
    fn dispatch(&self, job: Job) {
        // The receiver lives as long as the queue, so sending cannot fail.
        let _ = self.sender.lock().send(job);
    }
}

#[derive(Default)]
pub struct SettingsStore {
    current: RwLock<Option<NotificationSettings>>,
    subscribers: Mutex<Vec<Sender<NotificationSettings>>>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest settings, or `None` until the first fetch completes.
    pub fn current(&self) -> Option<NotificationSettings> {
        self.current.read().clone()
    }

    pub fn subscribe(&self) -> Receiver<NotificationSettings> {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn publish(&self, settings: NotificationSettings) {
        *self.current.write() = Some(settings.clone());
        self.subscribers
            .lock()
            .retain(|subscriber| subscriber.send(settings.clone()).is_ok());
        tracing::debug!("notification settings updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::AuthorizationStatus;
    use std::sync::Arc;

    fn authorized() -> NotificationSettings {
        NotificationSettings {
            authorization_status: AuthorizationStatus::Authorized,
            alert_enabled: true,
            sound_enabled: true,
            badge_enabled: false,
        }
    }

    #[test]
    fn publish_updates_current_and_notifies_subscribers() {
        let store = SettingsStore::new();
        let updates = store.subscribe();
        assert!(store.current().is_none());

        store.publish(authorized());
        assert_eq!(store.current(), Some(authorized()));
        assert_eq!(updates.try_recv().unwrap(), authorized());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let store = SettingsStore::new();
        drop(store.subscribe());
        store.publish(authorized());
        assert!(store.subscribers.lock().is_empty());
    }

    #[test]
    fn main_queue_defers_writes_until_drained() {
        let store = Arc::new(SettingsStore::new());
        let queue = Arc::new(MainQueue::new());

        let worker = {
            let store = Arc::clone(&store);
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                queue.dispatch(Box::new(move || store.publish(authorized())));
            })
        };
        worker.join().unwrap();

        assert!(store.current().is_none());
        assert_eq!(queue.run_pending(), 1);
        assert_eq!(store.current(), Some(authorized()));
        assert_eq!(queue.run_pending(), 0);
    }
}
