use std::sync::mpsc::Receiver;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tracing::instrument;

use crate::{
    actions::TaskStore,
    config::SchedulerConfig,
    error::Unschedulable,
    location::{LocationAuthorization, LocationPermission},
    notifications::{
        AuthorizationOptions, NotificationCategory, NotificationContent, NotificationSettings,
        NotificationSink, PendingRequest, REMINDER_CATEGORY_ID,
    },
    settings::{Dispatcher, ImmediateDispatcher, SettingsStore},
    task::Task,
    trigger,
};

/// What `schedule` did with a task. Skips are not errors and never reach the caller as one.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    Submitted,
    Skipped(Unschedulable),
}

impl ScheduleOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, ScheduleOutcome::Submitted)
    }
}

pub struct ReminderScheduler {
    sink: Arc<dyn NotificationSink>,
    location: Arc<dyn LocationAuthorization>,
    pub(crate) task_store: Option<Arc<dyn TaskStore>>,
    settings: Arc<SettingsStore>,
    dispatcher: Arc<dyn Dispatcher>,
    pub(crate) config: SchedulerConfig,
}

pub struct ReminderSchedulerBuilder {
    sink: Option<Arc<dyn NotificationSink>>,
    location: Option<Arc<dyn LocationAuthorization>>,
    task_store: Option<Arc<dyn TaskStore>>,
    settings: Option<Arc<SettingsStore>>,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    config: SchedulerConfig,
}

impl ReminderSchedulerBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            location: None,
            task_store: None,
            settings: None,
            dispatcher: None,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_location_authorization(mut self, location: Arc<dyn LocationAuthorization>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_task_store(mut self, store: Arc<dyn TaskStore>) -> Self {
        self.task_store = Some(store);
        self
    }

    pub fn with_settings_store(mut self, settings: Arc<SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Context on which settings updates from the sink are applied. Defaults to the
    /// callback's own thread.
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<ReminderScheduler> {
        let sink = self
            .sink
            .ok_or_else(|| anyhow!("a notification sink is required"))?;
        Ok(ReminderScheduler {
            sink,
            location: self
                .location
                .unwrap_or_else(|| Arc::new(LocationPermission::default())),
            task_store: self.task_store,
            settings: self.settings.unwrap_or_default(),
            dispatcher: self
                .dispatcher
                .unwrap_or_else(|| Arc::new(ImmediateDispatcher)),
            config: self.config,
        })
    }
}

impl Default for ReminderSchedulerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReminderScheduler {
    pub fn builder() -> ReminderSchedulerBuilder {
        ReminderSchedulerBuilder::new()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Registers the actionable reminder category with the sink.
    pub fn register_categories(&self) {
        self.sink.set_categories(vec![NotificationCategory::reminder()]);
    }

    /// Asks for alert, sound and badge permission, refreshes the cached settings and then
    /// reports whether permission was granted.
    pub fn request_authorization(&self, completion: impl FnOnce(bool) + Send + 'static) {
        let sink = Arc::clone(&self.sink);
        let settings = Arc::clone(&self.settings);
        let dispatcher = Arc::clone(&self.dispatcher);
        self.sink.request_authorization(
            AuthorizationOptions::all(),
            Box::new(move |granted| {
                tracing::info!(granted, "notification authorization answered");
                refresh_settings(sink.as_ref(), settings, dispatcher);
                completion(granted);
            }),
        );
    }

    pub fn fetch_settings(&self) {
        refresh_settings(
            self.sink.as_ref(),
            Arc::clone(&self.settings),
            Arc::clone(&self.dispatcher),
        );
    }

    pub fn settings(&self) -> Option<NotificationSettings> {
        self.settings.current()
    }

    pub fn subscribe_settings(&self) -> Receiver<NotificationSettings> {
        self.settings.subscribe()
    }

    /// Submits a notification for `task`, replacing any request already pending under
    /// the task's id. Unschedulable reminders are skipped without submitting anything.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub fn schedule(&self, task: &Task) -> ScheduleOutcome {
        let mut content = self.content_for(task);
        let location_granted = self.location.status().permits_location_reminders();
        let descriptor = match trigger::resolve(&task.id, &task.reminder, location_granted) {
            Ok(descriptor) => descriptor,
            Err(reason) => {
                tracing::debug!(%reason, "reminder not scheduled");
                return ScheduleOutcome::Skipped(reason);
            }
        };
        content.thread_identifier = Some(descriptor.thread_group.identifier().to_string());

        let request = PendingRequest {
            identifier: task.id.clone(),
            content,
            trigger: descriptor.trigger,
        };
        let task_id = task.id.clone();
        self.sink.add(
            request,
            Box::new(move |result| match result {
                Ok(()) => tracing::debug!(%task_id, "notification scheduled"),
                Err(err) => tracing::error!(%task_id, %err, "failed to schedule notification"),
            }),
        );
        ScheduleOutcome::Submitted
    }

    /// Withdraws the pending request for `task_id`, if any. Does not wait for an
    /// in-flight `schedule` of the same id, which may still land afterwards.
    #[instrument(skip(self))]
    pub fn cancel(&self, task_id: &str) {
        self.sink.remove_pending(&[task_id.to_string()]);
        tracing::debug!("pending notification removed");
    }

    fn content_for(&self, task: &Task) -> NotificationContent {
        let mut content = NotificationContent {
            title: task.name.clone(),
            body: self.config.reminder_body.clone(),
            category_identifier: REMINDER_CATEGORY_ID.to_string(),
            ..NotificationContent::default()
        };
        if let Err(err) = content.attach_task(task) {
            tracing::warn!(%err, "unable to embed task payload");
        }
        content
    }
}

fn refresh_settings(
    sink: &dyn NotificationSink,
    settings: Arc<SettingsStore>,
    dispatcher: Arc<dyn Dispatcher>,
) {
    sink.fetch_settings(Box::new(move |fetched| {
        dispatcher.dispatch(Box::new(move || settings.publish(fetched)));
    }));
}
