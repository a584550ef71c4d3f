//! Command handlers for the persisted grant context.

use std::sync::Arc;

use async_trait::async_trait;
use idadmin_core::bus::MediatorBuilder;
use idadmin_core::error::DomainError;
use idadmin_core::event::EventContext;
use idadmin_core::pipeline::{CommandPipeline, CommandSteps, Conflict, require_present};

use crate::domain::aggregates::PersistedGrant;
use crate::domain::commands::RemovePersistedGrant;
use crate::domain::events::{PersistedGrantEvent, PersistedGrantEventKind, PersistedGrantRemoved};
use crate::domain::repository::PersistedGrantRepository;

/// Notification subject for grant conflicts.
pub const PERSISTED_GRANT_SUBJECT: &str = "Persisted Grant";

/// Handles every command of the persisted grant context.
pub struct PersistedGrantCommandHandler {
    pipeline: CommandPipeline,
    repository: Arc<dyn PersistedGrantRepository>,
}

impl PersistedGrantCommandHandler {
    /// Creates a handler over one unit of work's repository.
    #[must_use]
    pub fn new(pipeline: CommandPipeline, repository: Arc<dyn PersistedGrantRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }
}

/// Registers `handler` for every persisted grant command.
#[must_use]
pub fn register(
    builder: MediatorBuilder,
    handler: &Arc<PersistedGrantCommandHandler>,
) -> MediatorBuilder {
    builder.register::<RemovePersistedGrant, _>(Arc::clone(handler))
}

#[async_trait]
impl CommandSteps<RemovePersistedGrant> for PersistedGrantCommandHandler {
    type Aggregate = PersistedGrant;
    type Event = PersistedGrantEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemovePersistedGrant) -> Result<Option<PersistedGrant>, DomainError> {
        self.repository.get_grant(&command.key).await
    }

    fn check(
        &self,
        _command: &RemovePersistedGrant,
        current: Option<&PersistedGrant>,
    ) -> Result<(), Conflict> {
        require_present(current, PERSISTED_GRANT_SUBJECT, "Grant not found").map(|_| ())
    }

    async fn mutate(
        &self,
        command: &RemovePersistedGrant,
        current: Option<PersistedGrant>,
    ) -> Result<(), DomainError> {
        let grant = current.ok_or_else(|| DomainError::AggregateNotFound(command.key.clone()))?;
        self.repository.remove(&grant).await
    }

    fn completed(&self, command: &RemovePersistedGrant, context: EventContext) -> PersistedGrantEvent {
        PersistedGrantEvent::new(
            PersistedGrantEventKind::Removed(PersistedGrantRemoved {
                key: command.key.clone(),
            }),
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use idadmin_core::bus::{CommandHandler, Mediator};
    use idadmin_core::pipeline::CommandOutcome;
    use idadmin_test_support::{
        FixedClock, RecordingSubscriber, RecordingUnitOfWork, fixed_now, recording_publisher,
    };
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::PERSISTED_GRANT_REMOVED_EVENT_TYPE;
    use crate::domain::repository::GrantSearch;

    struct MockPersistedGrantRepository {
        existing: Option<PersistedGrant>,
        removed: Mutex<Vec<String>>,
    }

    impl MockPersistedGrantRepository {
        fn with(existing: Option<PersistedGrant>) -> Self {
            Self {
                existing,
                removed: Mutex::new(Vec::new()),
            }
        }

        fn removed(&self) -> Vec<String> {
            self.removed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PersistedGrantRepository for MockPersistedGrantRepository {
        async fn get_grant(&self, key: &str) -> Result<Option<PersistedGrant>, DomainError> {
            Ok(self.existing.clone().filter(|g| g.key == key))
        }

        async fn search(&self, _search: &GrantSearch) -> Result<Vec<PersistedGrant>, DomainError> {
            Ok(self.existing.clone().into_iter().collect())
        }

        async fn count(&self, _search: &GrantSearch) -> Result<usize, DomainError> {
            Ok(usize::from(self.existing.is_some()))
        }

        async fn remove(&self, grant: &PersistedGrant) -> Result<(), DomainError> {
            self.removed.lock().unwrap().push(grant.key.clone());
            Ok(())
        }
    }

    struct Fixture {
        handler: PersistedGrantCommandHandler,
        repository: Arc<MockPersistedGrantRepository>,
        unit_of_work: Arc<RecordingUnitOfWork>,
        recorder: Arc<RecordingSubscriber>,
    }

    fn fixture(existing: Option<PersistedGrant>) -> Fixture {
        let (publisher, recorder) = recording_publisher();
        let repository = Arc::new(MockPersistedGrantRepository::with(existing));
        let unit_of_work = Arc::new(RecordingUnitOfWork::succeeding());
        let pipeline = CommandPipeline::new(
            unit_of_work.clone(),
            publisher,
            Arc::new(FixedClock::default()),
        );
        Fixture {
            handler: PersistedGrantCommandHandler::new(pipeline, repository.clone()),
            repository,
            unit_of_work,
            recorder,
        }
    }

    fn refresh_token(key: &str) -> PersistedGrant {
        PersistedGrant {
            key: key.to_owned(),
            grant_type: "refresh_token".to_owned(),
            subject_id: "alice".to_owned(),
            client_id: "spa".to_owned(),
            creation_time: fixed_now(),
            expiration: None,
            data: "{}".to_owned(),
        }
    }

    fn remove(key: &str) -> RemovePersistedGrant {
        RemovePersistedGrant {
            correlation_id: Uuid::new_v4(),
            key: key.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_remove_existing_grant_commits_and_publishes() {
        // Arrange
        let f = fixture(Some(refresh_token("grant-1")));

        // Act
        let outcome = f.handler.handle(remove("grant-1"), &CancellationToken::new()).await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(f.repository.removed(), vec!["grant-1"]);
        assert_eq!(f.unit_of_work.commit_count(), 1);
        let events = f.recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, PERSISTED_GRANT_REMOVED_EVENT_TYPE);
        assert_eq!(events[0].aggregate_id, "grant-1");
    }

    #[tokio::test]
    async fn test_remove_with_blank_key_is_rejected_before_load() {
        let f = fixture(Some(refresh_token("grant-1")));

        let outcome = f.handler.handle(remove(""), &CancellationToken::new()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert!(f.repository.removed().is_empty());
        assert_eq!(f.recorder.subjects(), vec!["Key"]);
    }

    #[tokio::test]
    async fn test_remove_unknown_grant_never_commits() {
        let f = fixture(None);

        let outcome = f.handler.handle(remove("grant-1"), &CancellationToken::new()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.unit_of_work.commit_count(), 0);
        assert_eq!(f.recorder.subjects(), vec!["Persisted Grant"]);
    }

    #[tokio::test]
    async fn test_mediator_dispatch() {
        let f = fixture(Some(refresh_token("grant-1")));
        let publisher = f.handler.pipeline.publisher().clone();
        let handler = Arc::new(f.handler);
        let mediator = register(Mediator::builder(publisher), &handler).build();

        let outcome = mediator
            .send(remove("grant-1"), &CancellationToken::new())
            .await;

        assert_eq!(outcome, Ok(CommandOutcome::Completed));
        assert_eq!(f.recorder.events().len(), 1);
    }
}
