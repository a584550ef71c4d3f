//! Shared application state.

use std::sync::Arc;

use idadmin_api_resource::application::command_handlers::{
    self as api_resource, ApiResourceCommandHandler,
};
use idadmin_client::application::command_handlers::{self as client, ClientCommandHandler};
use idadmin_core::bus::{Mediator, Publisher, Topic};
use idadmin_core::clock::Clock;
use idadmin_core::command::Command;
use idadmin_core::notification::{Notification, NotificationCollector};
use idadmin_core::pipeline::{CommandOutcome, CommandPipeline};
use idadmin_identity_resource::application::command_handlers::{
    self as identity_resource, IdentityResourceCommandHandler,
};
use idadmin_persisted_grant::application::command_handlers::{
    self as persisted_grant, PersistedGrantCommandHandler,
};
use idadmin_store::{InMemoryStore, StoreScope};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::error::ApiError;

/// Application state shared across all request handlers.
///
/// The publisher and its subscribers live for the whole process. Store
/// scopes and mediators are built per request.
#[derive(Clone)]
pub struct AppState {
    /// Committed configuration.
    pub store: InMemoryStore,
    /// Process-wide publisher.
    pub publisher: Arc<Publisher>,
    /// Notifications awaiting collection by their request.
    pub notifications: Arc<NotificationCollector>,
    /// Committed changes.
    pub audit: Arc<AuditLog>,
    /// Time source for event timestamps.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state and wire the publisher.
    #[must_use]
    pub fn new(store: InMemoryStore, clock: Arc<dyn Clock>) -> Self {
        let notifications = Arc::new(NotificationCollector::new());
        let audit = Arc::new(AuditLog::default());
        let publisher = Publisher::builder()
            .subscribe(Topic::Notifications, notifications.clone())
            .subscribe(Topic::AllEvents, audit.clone())
            .build();
        Self {
            store,
            publisher: Arc::new(publisher),
            notifications,
            audit,
            clock,
        }
    }

    /// A fresh unit of work for read-only queries.
    #[must_use]
    pub fn reader(&self) -> Arc<StoreScope> {
        self.store.scope()
    }

    /// A mediator whose handlers all share `scope` as repository and unit
    /// of work.
    fn mediator(&self, scope: &Arc<StoreScope>) -> Mediator {
        let pipeline =
            CommandPipeline::new(scope.clone(), self.publisher.clone(), self.clock.clone());
        let api_resources = Arc::new(ApiResourceCommandHandler::new(
            pipeline.clone(),
            scope.clone(),
        ));
        let clients = Arc::new(ClientCommandHandler::new(pipeline.clone(), scope.clone()));
        let identity_resources = Arc::new(IdentityResourceCommandHandler::new(
            pipeline.clone(),
            scope.clone(),
        ));
        let grants = Arc::new(PersistedGrantCommandHandler::new(pipeline, scope.clone()));

        let builder = Mediator::builder(self.publisher.clone());
        let builder = api_resource::register(builder, &api_resources);
        let builder = client::register(builder, &clients);
        let builder = identity_resource::register(builder, &identity_resources);
        persisted_grant::register(builder, &grants).build()
    }

    /// Runs `command` in its own unit of work.
    ///
    /// Dropping the returned future (the client went away) cancels the
    /// command and discards any notifications it raised.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the request's notifications,
    /// `ApiError::Failed` when nothing was saved, `ApiError::Cancelled`, or
    /// `ApiError::Bus` for wiring defects.
    pub async fn dispatch<C: Command>(&self, command: C) -> Result<(), ApiError> {
        let correlation_id = command.correlation_id();
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();

        let drain = DrainOnDrop {
            collector: &self.notifications,
            correlation_id,
        };

        let scope = self.store.scope();
        let outcome = self.mediator(&scope).send(command, &cancel).await;
        let notifications = drain.take();

        match outcome? {
            CommandOutcome::Completed => Ok(()),
            CommandOutcome::Rejected => Err(ApiError::Rejected(notifications)),
            CommandOutcome::Failed => Err(ApiError::Failed),
            CommandOutcome::Cancelled => Err(ApiError::Cancelled),
        }
    }
}

/// Removes a request's notifications from the collector when dropped, so an
/// abandoned request leaves nothing behind.
struct DrainOnDrop<'a> {
    collector: &'a NotificationCollector,
    correlation_id: Uuid,
}

impl DrainOnDrop<'_> {
    fn take(self) -> Vec<Notification> {
        self.collector.take(self.correlation_id)
    }
}

impl Drop for DrainOnDrop<'_> {
    fn drop(&mut self) {
        self.collector.take(self.correlation_id);
    }
}

#[cfg(test)]
mod tests {
    use idadmin_core::bus::{Message, Subscriber};

    use super::*;

    #[tokio::test]
    async fn test_dropped_request_drains_its_notifications() {
        // Arrange
        let collector = NotificationCollector::new();
        let abandoned = Uuid::new_v4();
        let other = Uuid::new_v4();
        for correlation_id in [abandoned, other] {
            collector
                .on_message(&Message::Notification(&Notification::new(
                    correlation_id,
                    "Client",
                    "Client not found",
                )))
                .await
                .unwrap();
        }

        // Act
        drop(DrainOnDrop {
            collector: &collector,
            correlation_id: abandoned,
        });

        // Assert
        assert!(!collector.has_notifications(abandoned));
        assert!(collector.has_notifications(other));
    }

    #[tokio::test]
    async fn test_taken_notifications_are_returned_once() {
        // Arrange
        let collector = NotificationCollector::new();
        let correlation_id = Uuid::new_v4();
        collector
            .on_message(&Message::Notification(&Notification::new(
                correlation_id,
                "Client",
                "Client not found",
            )))
            .await
            .unwrap();

        // Act
        let taken = DrainOnDrop {
            collector: &collector,
            correlation_id,
        }
        .take();

        // Assert
        assert_eq!(taken.len(), 1);
        assert!(collector.take(correlation_id).is_empty());
    }
}
