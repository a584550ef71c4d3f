//! Test subscribers that record or reject everything the publisher delivers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use idadmin_core::bus::{Message, Publisher, Subscriber, SubscriberError, Topic};
use idadmin_core::notification::Notification;
use uuid::Uuid;

/// Snapshot of a published domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Event type name.
    pub event_type: String,
    /// Natural key of the aggregate.
    pub aggregate_id: String,
    /// Correlation ID copied from the command.
    pub correlation_id: Uuid,
    /// Serialized payload.
    pub payload: serde_json::Value,
}

/// A subscriber that records every notification and event it receives.
#[derive(Debug, Default)]
pub struct RecordingSubscriber {
    notifications: Mutex<Vec<Notification>>,
    events: Mutex<Vec<PublishedEvent>>,
}

impl RecordingSubscriber {
    /// Returns a snapshot of all recorded notifications.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    /// Returns a snapshot of all recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Subjects of the recorded notifications, in order.
    pub fn subjects(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|n| n.subject)
            .collect()
    }
}

#[async_trait]
impl Subscriber for RecordingSubscriber {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn on_message(&self, message: &Message<'_>) -> Result<(), SubscriberError> {
        match message {
            Message::Notification(notification) => self
                .notifications
                .lock()
                .unwrap()
                .push((*notification).clone()),
            Message::Event(event) => {
                let metadata = event.metadata();
                self.events.lock().unwrap().push(PublishedEvent {
                    event_type: event.event_type().to_owned(),
                    aggregate_id: metadata.aggregate_id.clone(),
                    correlation_id: metadata.correlation_id,
                    payload: event.to_payload(),
                });
            }
        }
        Ok(())
    }
}

/// A subscriber that rejects every message. Useful for checking that
/// subscriber failures never change a command's outcome.
#[derive(Debug, Default)]
pub struct FailingSubscriber;

#[async_trait]
impl Subscriber for FailingSubscriber {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn on_message(&self, _message: &Message<'_>) -> Result<(), SubscriberError> {
        Err(SubscriberError::new("subscriber unavailable"))
    }
}

/// A publisher with one `RecordingSubscriber` on notifications and on all
/// events.
#[must_use]
pub fn recording_publisher() -> (Arc<Publisher>, Arc<RecordingSubscriber>) {
    let recorder = Arc::new(RecordingSubscriber::default());
    let publisher = Publisher::builder()
        .subscribe(Topic::Notifications, recorder.clone())
        .subscribe(Topic::AllEvents, recorder.clone())
        .build();
    (Arc::new(publisher), recorder)
}
