//! User-visible notifications.
//!
//! Follow and unfollow results are reported as short toast-like messages. The
//! coordinators receive the [`Notifier`] as an injected capability so front
//! ends decide how to present them and tests can record them.

use std::sync::Mutex;

use tracing::{error, info};

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;

/// Fire-and-forget sink for user-visible messages.
pub trait Notifier: Send + Sync {
    /// Reports a completed action.
    fn notify_success(&self, message: &str);

    /// Reports a failed action with its reason.
    fn notify_error(&self, message: &str);
}

/// A notifier that only writes to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(notification = message, "Success");
    }

    fn notify_error(&self, message: &str) {
        error!(notification = message, "Failure");
    }
}

/// A single recorded notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// A notifier that keeps every message in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the notifications delivered so far.
    pub fn notifications(&self) -> Vec<Notification> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the messages of the successful notifications.
    pub fn successes(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Success(message) => Some(message),
                Notification::Error(_) => None,
            })
            .collect()
    }

    /// Returns the messages of the error notifications.
    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message),
                Notification::Success(_) => None,
            })
            .collect()
    }

    fn push(&self, notification: Notification) {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify_success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn notify_error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}
