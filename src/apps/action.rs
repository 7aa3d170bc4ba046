// App actions and the runner that drives them
//
// An invocation goes Idle -> Busy -> {Rendered | Errored} -> Idle. Input is
// validated before the busy state is entered, so a rejected invocation never
// reaches the transport. The busy flag lives in the runner, keyed by
// (app id, action name), and is released by a guard on every exit path.

use super::fragment::RESULT_REGION;
use super::AppDescriptor;
use crate::error::{LauncherError, Result};
use crate::events::{ActionStatus, Event, EventBus, EventKind, BROADCAST};
use crate::notice::Notice;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A user-triggered operation inside an app's view
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppAction: Send + Sync {
    /// Reject unusable input before any work starts
    ///
    /// # Errors
    /// - `ValidationError` with a user-facing message
    fn validate(&self, input: &ActionInput) -> Result<()>;

    /// Do the work; the returned HTML replaces the app's result region
    async fn run(&self, input: ActionInput) -> Result<ActionOutcome>;
}

/// Form fields submitted from a mounted fragment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionInput {
    fields: HashMap<String, String>,
}

impl ActionInput {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Trimmed field value; missing fields read as empty
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }

    /// Trimmed, non-empty field value
    ///
    /// # Errors
    /// - `ValidationError(message)` when the field is missing or blank
    pub fn require(&self, name: &str, message: &str) -> Result<&str> {
        let value = self.field(name);
        if value.is_empty() {
            Err(LauncherError::ValidationError(message.to_string()))
        } else {
            Ok(value)
        }
    }
}

/// What a successful action produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOutcome {
    /// Replacement content for the result region
    pub html: String,

    /// Notice shown after completion
    pub notice: Option<Notice>,

    /// External page the shell should offer to open
    pub open_url: Option<String>,
}

impl ActionOutcome {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    pub fn with_open_url(mut self, url: impl Into<String>) -> Self {
        self.open_url = Some(url.into());
        self
    }
}

/// Result of one invocation as seen by the shell
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport {
    pub app_id: String,
    pub action: String,

    /// `Idle` when the invocation was rejected before starting
    pub status: ActionStatus,

    /// Replacement for the result region; None leaves it untouched
    pub result_html: Option<String>,

    pub notice: Option<Notice>,
    pub open_url: Option<String>,
}

/// Inline notice placed in the result region when an action fails
pub fn error_region_html() -> String {
    "<div class=\"result-error\"><strong>Something went wrong!</strong>\
     <p>The request failed or the service did not answer as expected.</p></div>"
        .to_string()
}

type InFlightKey = (String, String);

/// Executes actions with a per-(app, action) re-entrancy guard
pub struct ActionRunner {
    event_bus: Arc<EventBus>,
    in_flight: Mutex<HashSet<InFlightKey>>,
}

impl ActionRunner {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// True while an invocation of this action is in progress
    pub fn is_busy(&self, app_id: &str, action: &str) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(&(app_id.to_string(), action.to_string())))
            .unwrap_or(false)
    }

    /// Invoke `action_name` on `app`
    ///
    /// Validation and run failures are caught here and reported through the
    /// returned `ActionReport`.
    ///
    /// # Errors
    /// - `UnknownAction` when the app has no such action
    /// - `ActionBusy` when the same action is still running
    pub async fn invoke(
        &self,
        app: &AppDescriptor,
        action_name: &str,
        input: ActionInput,
    ) -> Result<ActionReport> {
        let action = app.action(action_name).ok_or_else(|| LauncherError::UnknownAction {
            app_id: app.id.clone(),
            action: action_name.to_string(),
        })?;

        let mut report = ActionReport {
            app_id: app.id.clone(),
            action: action_name.to_string(),
            status: ActionStatus::Idle,
            result_html: None,
            notice: None,
            open_url: None,
        };

        if let Err(e) = action.validate(&input) {
            tracing::debug!("Action {}/{} rejected: {}", app.id, action_name, e);
            report.notice = Some(Notice::warning(validation_message(e)));
            return Ok(report);
        }

        let _guard = self.begin(&app.id, action_name)?;
        self.publish_status(&app.id, action_name, ActionStatus::Busy);

        match action.run(input).await {
            Ok(outcome) => {
                report.status = ActionStatus::Rendered;
                report.result_html = Some(outcome.html);
                report.notice = outcome.notice;
                report.open_url = outcome.open_url;
            }
            Err(e) => {
                tracing::error!("Action {}/{} failed: {}", app.id, action_name, e);
                let message = if e.is_transport() {
                    "Communication error! Please try again.".to_string()
                } else {
                    e.to_string()
                };
                report.status = ActionStatus::Errored(e.to_string());
                report.result_html = Some(error_region_html());
                report.notice = Some(Notice::error(message));
            }
        }

        self.publish_status(&app.id, action_name, report.status.clone());
        Ok(report)
    }

    fn begin(&self, app_id: &str, action: &str) -> Result<InFlightGuard<'_>> {
        let key = (app_id.to_string(), action.to_string());
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| LauncherError::EventError("Action state lock poisoned".to_string()))?;

        if !set.insert(key.clone()) {
            return Err(LauncherError::ActionBusy {
                app_id: key.0,
                action: key.1,
            });
        }

        Ok(InFlightGuard { runner: self, key })
    }

    fn publish_status(&self, app_id: &str, action: &str, status: ActionStatus) {
        self.event_bus.emit(Event::new(
            "action_runner",
            BROADCAST,
            EventKind::ActionStatusChange {
                app_id: app_id.to_string(),
                action: action.to_string(),
                status,
            },
        ));
    }
}

/// Clears the in-flight flag and reports `Idle` when dropped
struct InFlightGuard<'a> {
    runner: &'a ActionRunner,
    key: InFlightKey,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.runner.in_flight.lock() {
            set.remove(&self.key);
        }
        self.runner
            .publish_status(&self.key.0, &self.key.1, ActionStatus::Idle);
    }
}

fn validation_message(err: LauncherError) -> String {
    match err {
        LauncherError::ValidationError(message) => message,
        other => other.to_string(),
    }
}

/// Apply a report to a freshly rendered fragment
pub fn apply_report(app: &AppDescriptor, report: &ActionReport) -> super::Fragment {
    let mut fragment = app.render();
    if let Some(html) = &report.result_html {
        if !fragment.fill_region(RESULT_REGION, html) {
            tracing::warn!("App '{}' has no result region", app.id);
        }
    }
    fragment
}
