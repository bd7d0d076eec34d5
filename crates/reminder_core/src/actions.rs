use crate::{
    notifications::{
        DeliveredNotification, NotificationResponse, PresentationOption, MARK_AS_DONE_ACTION_ID,
    },
    scheduler::ReminderScheduler,
    task::Task,
};

/// The caller's task list, as seen from notification actions.
pub trait TaskStore: Send + Sync {
    fn remove(&self, task: &Task);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The task store was told to remove the task.
    Completed { task_id: String },
    /// Marked done, but no task store is configured; only the pending request was handled.
    NoTaskStore { task_id: String },
    Ignored,
    UnreadablePayload,
}

impl ReminderScheduler {
    /// Delivered while the app is in the foreground: always show it.
    pub fn will_present(&self, _notification: &DeliveredNotification) -> PresentationOption {
        PresentationOption::Banner
    }

    /// Applies the user's action on a delivered reminder, then signals `completion`
    /// exactly once regardless of the outcome.
    pub fn handle_response(
        &self,
        response: &NotificationResponse,
        completion: impl FnOnce(),
    ) -> ResponseOutcome {
        let outcome = self.apply_response(response);
        completion();
        outcome
    }

    fn apply_response(&self, response: &NotificationResponse) -> ResponseOutcome {
        if response.action_identifier != MARK_AS_DONE_ACTION_ID {
            return ResponseOutcome::Ignored;
        }
        let task = match response.notification.request.content.embedded_task() {
            Ok(task) => task,
            Err(err) => {
                tracing::debug!(%err, "ignoring action on notification without a usable task");
                return ResponseOutcome::UnreadablePayload;
            }
        };

        if self.config.cancel_on_complete {
            self.cancel(&task.id);
        }
        let Some(store) = &self.task_store else {
            tracing::warn!(task_id = %task.id, "no task store configured; task not removed");
            return ResponseOutcome::NoTaskStore { task_id: task.id };
        };
        store.remove(&task);
        tracing::info!(task_id = %task.id, "task marked as done from notification");
        ResponseOutcome::Completed { task_id: task.id }
    }
}
