use anyhow::{Context, Result};

pub const DEFAULT_REMINDER_BODY: &str = "Gentle reminder for your task!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub reminder_body: String,
    /// Whether "mark as done" also withdraws the task's pending (possibly repeating) request.
    pub cancel_on_complete: bool,
}

impl SchedulerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(body) = lookup("REMINDER_BODY") {
            let body = body.trim();
            if !body.is_empty() {
                config.reminder_body = body.to_string();
            }
        }
        if let Some(flag) = lookup("REMINDER_CANCEL_ON_COMPLETE") {
            config.cancel_on_complete = parse_flag(&flag)
                .with_context(|| format!("REMINDER_CANCEL_ON_COMPLETE=`{flag}`"))?;
        }
        Ok(config)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            reminder_body: DEFAULT_REMINDER_BODY.to_string(),
            cancel_on_complete: true,
        }
    }
}

pub fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got `{other}`"),
    }
}
