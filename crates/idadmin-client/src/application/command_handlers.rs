//! Command handlers for the client context.

use std::sync::Arc;

use async_trait::async_trait;
use idadmin_core::bus::MediatorBuilder;
use idadmin_core::error::DomainError;
use idadmin_core::event::EventContext;
use idadmin_core::pipeline::{CommandPipeline, CommandSteps, Conflict, require_absent, require_present};

use crate::domain::aggregates::{Client, copy_id};
use crate::domain::commands::{
    CopyClient, RemoveClient, RemoveClientClaim, RemoveClientProperty, RemoveClientSecret,
    SaveClient, SaveClientClaim, SaveClientProperty, SaveClientSecret, UpdateClient,
};
use crate::domain::events::{
    ClientClaimRemoved, ClientClaimSaved, ClientCopied, ClientEvent, ClientEventKind,
    ClientPropertyRemoved, ClientPropertySaved, ClientRemoved, ClientSaved, ClientSecretRemoved,
    ClientSecretSaved, ClientUpdated,
};
use crate::domain::repository::ClientRepository;

/// Notification subject for client-level conflicts.
pub const CLIENT_SUBJECT: &str = "Client";
/// Notification subject for secret mismatches.
pub const CLIENT_SECRET_SUBJECT: &str = "Client Secret";
/// Notification subject for claim conflicts.
pub const CLIENT_CLAIM_SUBJECT: &str = "Client Claim";
/// Notification subject for property conflicts.
pub const CLIENT_PROPERTY_SUBJECT: &str = "Client Property";

const CLIENT_NOT_FOUND: &str = "Client not found";

/// Handles every command of the client context.
pub struct ClientCommandHandler {
    pipeline: CommandPipeline,
    repository: Arc<dyn ClientRepository>,
}

impl ClientCommandHandler {
    /// Creates a handler over one unit of work's repository.
    #[must_use]
    pub fn new(pipeline: CommandPipeline, repository: Arc<dyn ClientRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }
}

/// Registers `handler` for every client command.
#[must_use]
pub fn register(builder: MediatorBuilder, handler: &Arc<ClientCommandHandler>) -> MediatorBuilder {
    builder
        .register::<SaveClient, _>(Arc::clone(handler))
        .register::<UpdateClient, _>(Arc::clone(handler))
        .register::<RemoveClient, _>(Arc::clone(handler))
        .register::<CopyClient, _>(Arc::clone(handler))
        .register::<SaveClientSecret, _>(Arc::clone(handler))
        .register::<RemoveClientSecret, _>(Arc::clone(handler))
        .register::<SaveClientClaim, _>(Arc::clone(handler))
        .register::<RemoveClientClaim, _>(Arc::clone(handler))
        .register::<SaveClientProperty, _>(Arc::clone(handler))
        .register::<RemoveClientProperty, _>(Arc::clone(handler))
}

fn client_found(current: Option<&Client>) -> Result<&Client, Conflict> {
    require_present(current, CLIENT_SUBJECT, CLIENT_NOT_FOUND)
}

#[async_trait]
impl CommandSteps<SaveClient> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveClient) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client.client_id).await
    }

    fn check(&self, _command: &SaveClient, current: Option<&Client>) -> Result<(), Conflict> {
        require_absent(current, CLIENT_SUBJECT, "Client already exists")
    }

    async fn mutate(&self, command: &SaveClient, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository.add(Client::new(command.settings())).await
    }

    fn completed(&self, command: &SaveClient, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::Saved(ClientSaved {
                client: command.settings(),
                client_type: command.client_type,
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<UpdateClient> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &UpdateClient) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.old_client_id).await
    }

    fn check(&self, _command: &UpdateClient, current: Option<&Client>) -> Result<(), Conflict> {
        client_found(current).map(|_| ())
    }

    async fn mutate(&self, command: &UpdateClient, current: Option<Client>) -> Result<(), DomainError> {
        let current = current
            .ok_or_else(|| DomainError::AggregateNotFound(command.old_client_id.clone()))?;
        self.repository
            .update_with_children(
                &command.old_client_id,
                current.with_settings(command.client.clone()),
            )
            .await
    }

    fn completed(&self, command: &UpdateClient, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::Updated(ClientUpdated {
                old_client_id: command.old_client_id.clone(),
                client: command.client.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveClient> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveClient) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, _command: &RemoveClient, current: Option<&Client>) -> Result<(), Conflict> {
        client_found(current).map(|_| ())
    }

    async fn mutate(&self, command: &RemoveClient, current: Option<Client>) -> Result<(), DomainError> {
        let client =
            current.ok_or_else(|| DomainError::AggregateNotFound(command.client_id.clone()))?;
        self.repository.remove(&client).await
    }

    fn completed(&self, command: &RemoveClient, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::Removed(ClientRemoved {
                client_id: command.client_id.clone(),
            }),
            context,
        )
    }
}

/// What [`CopyClient`] loads: the source and whether its copy id is taken.
#[derive(Debug, Clone)]
pub struct CopySource {
    /// The client to copy.
    pub source: Client,
    /// A client is already stored under the copy id.
    pub copy_taken: bool,
}

#[async_trait]
impl CommandSteps<CopyClient> for ClientCommandHandler {
    type Aggregate = CopySource;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &CopyClient) -> Result<Option<CopySource>, DomainError> {
        let Some(source) = self.repository.get_client(&command.client_id).await? else {
            return Ok(None);
        };
        let copy_taken = self
            .repository
            .get_client(&copy_id(&command.client_id))
            .await?
            .is_some();
        Ok(Some(CopySource { source, copy_taken }))
    }

    fn check(&self, _command: &CopyClient, current: Option<&CopySource>) -> Result<(), Conflict> {
        let loaded = require_present(current, CLIENT_SUBJECT, CLIENT_NOT_FOUND)?;
        if loaded.copy_taken {
            return Err(Conflict::already_exists(CLIENT_SUBJECT, "Client copy already exists"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &CopyClient, current: Option<CopySource>) -> Result<(), DomainError> {
        let loaded =
            current.ok_or_else(|| DomainError::AggregateNotFound(command.client_id.clone()))?;
        self.repository.add(loaded.source.copied()).await
    }

    fn completed(&self, command: &CopyClient, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::Copied(ClientCopied {
                source_client_id: command.client_id.clone(),
                client_id: copy_id(&command.client_id),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<SaveClientSecret> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveClientSecret) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, _command: &SaveClientSecret, current: Option<&Client>) -> Result<(), Conflict> {
        client_found(current).map(|_| ())
    }

    async fn mutate(&self, command: &SaveClientSecret, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .add_secret(&command.client_id, command.secret.to_secret())
            .await
    }

    fn completed(&self, command: &SaveClientSecret, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::SecretSaved(ClientSecretSaved {
                client_id: command.client_id.clone(),
                secret_type: command.secret.secret_type.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveClientSecret> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveClientSecret) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, command: &RemoveClientSecret, current: Option<&Client>) -> Result<(), Conflict> {
        let client = client_found(current)?;
        if !client.has_secret(&command.secret_type, &command.value) {
            return Err(Conflict::mismatch(CLIENT_SECRET_SUBJECT, "Invalid secret"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &RemoveClientSecret, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .remove_secret(&command.client_id, &command.secret_type, &command.value)
            .await
    }

    fn completed(&self, command: &RemoveClientSecret, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::SecretRemoved(ClientSecretRemoved {
                client_id: command.client_id.clone(),
                secret_type: command.secret_type.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<SaveClientClaim> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveClientClaim) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, command: &SaveClientClaim, current: Option<&Client>) -> Result<(), Conflict> {
        let client = client_found(current)?;
        if client.has_claim(&command.claim.claim_type, &command.claim.value) {
            return Err(Conflict::already_exists(CLIENT_CLAIM_SUBJECT, "Claim already exists"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &SaveClientClaim, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .add_claim(&command.client_id, command.claim.clone())
            .await
    }

    fn completed(&self, command: &SaveClientClaim, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::ClaimSaved(ClientClaimSaved {
                client_id: command.client_id.clone(),
                claim: command.claim.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveClientClaim> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveClientClaim) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, command: &RemoveClientClaim, current: Option<&Client>) -> Result<(), Conflict> {
        let client = client_found(current)?;
        if !client.has_claim(&command.claim_type, &command.value) {
            return Err(Conflict::mismatch(CLIENT_CLAIM_SUBJECT, "Invalid claim"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &RemoveClientClaim, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .remove_claim(&command.client_id, &command.claim_type, &command.value)
            .await
    }

    fn completed(&self, command: &RemoveClientClaim, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::ClaimRemoved(ClientClaimRemoved {
                client_id: command.client_id.clone(),
                claim_type: command.claim_type.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<SaveClientProperty> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveClientProperty) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, command: &SaveClientProperty, current: Option<&Client>) -> Result<(), Conflict> {
        let client = client_found(current)?;
        if client.has_property_key(&command.property.key) {
            return Err(Conflict::already_exists(
                CLIENT_PROPERTY_SUBJECT,
                "Property already exists",
            ));
        }
        Ok(())
    }

    async fn mutate(&self, command: &SaveClientProperty, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .add_property(&command.client_id, command.property.clone())
            .await
    }

    fn completed(&self, command: &SaveClientProperty, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::PropertySaved(ClientPropertySaved {
                client_id: command.client_id.clone(),
                key: command.property.key.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveClientProperty> for ClientCommandHandler {
    type Aggregate = Client;
    type Event = ClientEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveClientProperty) -> Result<Option<Client>, DomainError> {
        self.repository.get_client(&command.client_id).await
    }

    fn check(&self, command: &RemoveClientProperty, current: Option<&Client>) -> Result<(), Conflict> {
        let client = client_found(current)?;
        if !client.has_property(&command.key, &command.value) {
            return Err(Conflict::mismatch(CLIENT_PROPERTY_SUBJECT, "Invalid property"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &RemoveClientProperty, _current: Option<Client>) -> Result<(), DomainError> {
        self.repository
            .remove_property(&command.client_id, &command.key, &command.value)
            .await
    }

    fn completed(&self, command: &RemoveClientProperty, context: EventContext) -> ClientEvent {
        ClientEvent::new(
            ClientEventKind::PropertyRemoved(ClientPropertyRemoved {
                client_id: command.client_id.clone(),
                key: command.key.clone(),
            }),
            context,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use idadmin_core::bus::{CommandHandler, Mediator};
    use idadmin_core::pipeline::CommandOutcome;
    use idadmin_core::secret::{HashType, NewSecret, SHARED_SECRET, Secret};
    use idadmin_test_support::{
        FixedClock, RecordingSubscriber, RecordingUnitOfWork, recording_publisher,
    };
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::{
        ClientClaim, ClientProperty, ClientSettings, ClientType, grant_types,
    };
    use crate::domain::events::{CLIENT_COPIED_EVENT_TYPE, CLIENT_SAVED_EVENT_TYPE};

    #[derive(Default)]
    struct MockClientRepository {
        clients: HashMap<String, Client>,
        calls: Mutex<Vec<String>>,
    }

    impl MockClientRepository {
        fn with(clients: Vec<Client>) -> Self {
            Self {
                clients: clients
                    .into_iter()
                    .map(|c| (c.client_id().to_owned(), c))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, call: String) -> Result<(), DomainError> {
            self.calls.lock().unwrap().push(call);
            Ok(())
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ClientRepository for MockClientRepository {
        async fn get_client(&self, client_id: &str) -> Result<Option<Client>, DomainError> {
            Ok(self.clients.get(client_id).cloned())
        }

        async fn list(&self) -> Result<Vec<Client>, DomainError> {
            Ok(self.clients.values().cloned().collect())
        }

        async fn add(&self, client: Client) -> Result<(), DomainError> {
            self.record(format!(
                "add:{}:{}",
                client.client_id(),
                client.settings.allowed_grant_types.join(",")
            ))
        }

        async fn update_with_children(&self, old_client_id: &str, client: Client) -> Result<(), DomainError> {
            self.record(format!(
                "update_with_children:{old_client_id}->{}:{}",
                client.client_id(),
                client.claims.len()
            ))
        }

        async fn remove(&self, client: &Client) -> Result<(), DomainError> {
            self.record(format!("remove:{}", client.client_id()))
        }

        async fn add_secret(&self, client_id: &str, secret: Secret) -> Result<(), DomainError> {
            self.record(format!("add_secret:{client_id}:{}", secret.value))
        }

        async fn remove_secret(&self, client_id: &str, secret_type: &str, value: &str) -> Result<(), DomainError> {
            self.record(format!("remove_secret:{client_id}:{secret_type}:{value}"))
        }

        async fn add_claim(&self, client_id: &str, claim: ClientClaim) -> Result<(), DomainError> {
            self.record(format!("add_claim:{client_id}:{}={}", claim.claim_type, claim.value))
        }

        async fn remove_claim(&self, client_id: &str, claim_type: &str, value: &str) -> Result<(), DomainError> {
            self.record(format!("remove_claim:{client_id}:{claim_type}={value}"))
        }

        async fn add_property(&self, client_id: &str, property: ClientProperty) -> Result<(), DomainError> {
            self.record(format!("add_property:{client_id}:{}", property.key))
        }

        async fn remove_property(&self, client_id: &str, key: &str, value: &str) -> Result<(), DomainError> {
            self.record(format!("remove_property:{client_id}:{key}={value}"))
        }
    }

    struct Fixture {
        handler: ClientCommandHandler,
        repository: Arc<MockClientRepository>,
        unit_of_work: Arc<RecordingUnitOfWork>,
        recorder: Arc<RecordingSubscriber>,
    }

    fn fixture(clients: Vec<Client>) -> Fixture {
        let (publisher, recorder) = recording_publisher();
        let repository = Arc::new(MockClientRepository::with(clients));
        let unit_of_work = Arc::new(RecordingUnitOfWork::succeeding());
        let pipeline = CommandPipeline::new(
            unit_of_work.clone(),
            publisher,
            Arc::new(FixedClock::default()),
        );
        Fixture {
            handler: ClientCommandHandler::new(pipeline, repository.clone()),
            repository,
            unit_of_work,
            recorder,
        }
    }

    fn settings(client_id: &str) -> ClientSettings {
        serde_json::from_value(serde_json::json!({
            "client_id": client_id,
            "client_name": "Shop front",
            "redirect_uris": ["https://shop.example.com/signin-oidc"],
        }))
        .unwrap()
    }

    fn shop() -> Client {
        let mut client = Client::new(settings("shop"));
        client.secrets.push(Secret {
            secret_type: SHARED_SECRET.to_owned(),
            value: HashType::Sha256.apply("secret"),
            description: None,
            expiration: None,
        });
        client.claims.push(ClientClaim {
            claim_type: "tenant".to_owned(),
            value: "eu".to_owned(),
        });
        client.properties.push(ClientProperty {
            key: "theme".to_owned(),
            value: "dark".to_owned(),
        });
        client
    }

    fn cancel() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn test_save_client_applies_preset_before_storing() {
        // Arrange
        let f = fixture(Vec::new());
        let command = SaveClient {
            correlation_id: Uuid::new_v4(),
            client: settings("shop"),
            client_type: ClientType::Spa,
        };

        // Act
        let outcome = f.handler.handle(command, &cancel()).await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(
            f.repository.calls(),
            vec![format!("add:shop:{}", grant_types::AUTHORIZATION_CODE)]
        );
        let events = f.recorder.events();
        assert_eq!(events[0].event_type, CLIENT_SAVED_EVENT_TYPE);
        assert_eq!(events[0].payload["Saved"]["client_type"], "spa");
        assert_eq!(events[0].payload["Saved"]["client"]["require_pkce"], true);
    }

    #[tokio::test]
    async fn test_save_existing_client_notifies_client() {
        let f = fixture(vec![shop()]);
        let command = SaveClient {
            correlation_id: Uuid::new_v4(),
            client: settings("shop"),
            client_type: ClientType::Empty,
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert!(f.repository.calls().is_empty());
        assert_eq!(f.unit_of_work.commit_count(), 0);
        assert_eq!(f.recorder.subjects(), vec!["Client"]);
        assert_eq!(f.recorder.notifications()[0].message, "Client already exists");
    }

    #[tokio::test]
    async fn test_update_keeps_children_of_stored_client() {
        let f = fixture(vec![shop()]);
        let command = UpdateClient {
            correlation_id: Uuid::new_v4(),
            old_client_id: "shop".to_owned(),
            client: settings("shop-eu"),
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(
            f.repository.calls(),
            vec!["update_with_children:shop->shop-eu:1"]
        );
        assert_eq!(f.recorder.events()[0].aggregate_id, "shop-eu");
    }

    #[tokio::test]
    async fn test_copy_client_stores_copy_under_prefixed_id() {
        // Arrange
        let f = fixture(vec![shop()]);
        let command = CopyClient {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
        };

        // Act
        let outcome = f.handler.handle(command, &cancel()).await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(f.repository.calls(), vec!["add:copy-of-shop:"]);
        let events = f.recorder.events();
        assert_eq!(events[0].event_type, CLIENT_COPIED_EVENT_TYPE);
        assert_eq!(events[0].aggregate_id, "copy-of-shop");
        assert_eq!(events[0].payload["Copied"]["source_client_id"], "shop");
    }

    #[tokio::test]
    async fn test_copy_is_rejected_when_copy_id_is_taken() {
        let f = fixture(vec![shop(), shop().copied()]);
        let command = CopyClient {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert!(f.repository.calls().is_empty());
        assert_eq!(f.recorder.notifications()[0].message, "Client copy already exists");
    }

    #[tokio::test]
    async fn test_copy_of_missing_client_is_not_found() {
        let f = fixture(Vec::new());
        let command = CopyClient {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.recorder.notifications()[0].message, "Client not found");
    }

    #[tokio::test]
    async fn test_save_secret_stores_digest() {
        let f = fixture(vec![shop()]);
        let command = SaveClientSecret {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            secret: NewSecret {
                secret_type: SHARED_SECRET.to_owned(),
                value: "s3cret".to_owned(),
                description: None,
                expiration: None,
                hash_type: HashType::Sha256,
            },
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(
            f.repository.calls(),
            vec![format!("add_secret:shop:{}", HashType::Sha256.apply("s3cret"))]
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_secret_notifies_client_secret() {
        let f = fixture(vec![shop()]);
        let command = RemoveClientSecret {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            secret_type: SHARED_SECRET.to_owned(),
            value: "secret".to_owned(),
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.recorder.subjects(), vec!["Client Secret"]);
        assert!(f.repository.calls().is_empty());
    }

    #[tokio::test]
    async fn test_claims_are_matched_on_type_and_value() {
        // Arrange
        let f = fixture(vec![shop()]);
        let wrong_value = RemoveClientClaim {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            claim_type: "tenant".to_owned(),
            value: "us".to_owned(),
        };
        let exact = RemoveClientClaim {
            value: "eu".to_owned(),
            correlation_id: Uuid::new_v4(),
            ..wrong_value.clone()
        };

        // Act
        let rejected = f.handler.handle(wrong_value, &cancel()).await;
        let removed = f.handler.handle(exact, &cancel()).await;

        // Assert
        assert_eq!(rejected, CommandOutcome::Rejected);
        assert_eq!(removed, CommandOutcome::Completed);
        assert_eq!(f.recorder.subjects(), vec!["Client Claim"]);
        assert_eq!(f.repository.calls(), vec!["remove_claim:shop:tenant=eu"]);
        assert_eq!(f.unit_of_work.commit_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_claim_is_rejected() {
        let f = fixture(vec![shop()]);
        let command = SaveClientClaim {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            claim: ClientClaim {
                claim_type: "tenant".to_owned(),
                value: "eu".to_owned(),
            },
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.recorder.subjects(), vec!["Client Claim"]);
    }

    #[tokio::test]
    async fn test_property_key_must_be_unique() {
        let f = fixture(vec![shop()]);
        let command = SaveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            property: ClientProperty {
                key: "theme".to_owned(),
                value: "light".to_owned(),
            },
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.recorder.subjects(), vec!["Client Property"]);
    }

    #[tokio::test]
    async fn test_remove_property_publishes_key_only() {
        let f = fixture(vec![shop()]);
        let command = RemoveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            key: "theme".to_owned(),
            value: "dark".to_owned(),
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Completed);
        assert_eq!(
            f.recorder.events()[0].payload,
            serde_json::json!({ "PropertyRemoved": { "client_id": "shop", "key": "theme" } })
        );
    }

    #[tokio::test]
    async fn test_child_command_on_missing_client_is_not_found() {
        let f = fixture(Vec::new());
        let command = SaveClientProperty {
            correlation_id: Uuid::new_v4(),
            client_id: "shop".to_owned(),
            property: ClientProperty {
                key: "theme".to_owned(),
                value: "dark".to_owned(),
            },
        };

        let outcome = f.handler.handle(command, &cancel()).await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.recorder.subjects(), vec!["Client"]);
    }

    #[tokio::test]
    async fn test_remove_client() {
        let f = fixture(vec![shop()]);
        let publisher = f.handler.pipeline.publisher().clone();
        let handler = Arc::new(f.handler);
        let mediator = register(Mediator::builder(publisher), &handler).build();

        let outcome = mediator
            .send(
                RemoveClient {
                    correlation_id: Uuid::new_v4(),
                    client_id: "shop".to_owned(),
                },
                &cancel(),
            )
            .await;

        assert_eq!(outcome, Ok(CommandOutcome::Completed));
        assert_eq!(f.repository.calls(), vec!["remove:shop"]);
    }
}
