//! Notifications: expected business failures as values.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::bus::{Message, Subscriber, SubscriberError};

/// A structured record of an expected failure, published instead of raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Correlation ID of the command that raised it.
    #[serde(skip)]
    pub correlation_id: Uuid,
    /// The entity or field the failure concerns, e.g. `"Api"` or `"Name"`.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

impl Notification {
    /// Creates a notification for the command identified by `correlation_id`.
    #[must_use]
    pub fn new(correlation_id: Uuid, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            correlation_id,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Subscriber that keeps every notification, grouped by correlation ID.
///
/// The HTTP layer drains the group belonging to its request once the command
/// has returned. Repeated subjects within one request are kept as-is.
#[derive(Debug, Default)]
pub struct NotificationCollector {
    by_request: Mutex<HashMap<Uuid, Vec<Notification>>>,
}

impl NotificationCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if any notification was raised for `correlation_id`.
    #[must_use]
    pub fn has_notifications(&self, correlation_id: Uuid) -> bool {
        self.by_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&correlation_id)
            .is_some_and(|n| !n.is_empty())
    }

    /// Removes and returns the notifications raised for `correlation_id`,
    /// in publication order.
    pub fn take(&self, correlation_id: Uuid) -> Vec<Notification> {
        self.by_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&correlation_id)
            .unwrap_or_default()
    }
}

#[async_trait]
impl Subscriber for NotificationCollector {
    fn name(&self) -> &'static str {
        "notification-collector"
    }

    async fn on_message(&self, message: &Message<'_>) -> Result<(), SubscriberError> {
        let Message::Notification(notification) = message else {
            return Ok(());
        };
        let mut by_request = self
            .by_request
            .lock()
            .map_err(|_| SubscriberError::new("notification collector lock poisoned"))?;
        by_request
            .entry(notification.correlation_id)
            .or_default()
            .push((*notification).clone());
        Ok(())
    }
}
