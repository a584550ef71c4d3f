//! Command handlers for the identity resource context.

use std::sync::Arc;

use async_trait::async_trait;
use idadmin_core::bus::MediatorBuilder;
use idadmin_core::error::DomainError;
use idadmin_core::event::EventContext;
use idadmin_core::pipeline::{CommandPipeline, CommandSteps, Conflict, require_absent, require_present};

use crate::domain::aggregates::IdentityResource;
use crate::domain::commands::{
    RegisterIdentityResource, RemoveIdentityResource, UpdateIdentityResource,
};
use crate::domain::events::{
    IdentityResourceEvent, IdentityResourceEventKind, IdentityResourceRegistered,
    IdentityResourceRemoved, IdentityResourceUpdated,
};
use crate::domain::repository::IdentityResourceRepository;

/// Notification subject for identity resource conflicts.
pub const IDENTITY_RESOURCE_SUBJECT: &str = "Identity Resource";

/// Handles every command of the identity resource context.
pub struct IdentityResourceCommandHandler {
    pipeline: CommandPipeline,
    repository: Arc<dyn IdentityResourceRepository>,
}

impl IdentityResourceCommandHandler {
    /// Creates a handler over one unit of work's repository.
    #[must_use]
    pub fn new(pipeline: CommandPipeline, repository: Arc<dyn IdentityResourceRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }
}

/// Registers `handler` for every identity resource command.
#[must_use]
pub fn register(
    builder: MediatorBuilder,
    handler: &Arc<IdentityResourceCommandHandler>,
) -> MediatorBuilder {
    builder
        .register::<RegisterIdentityResource, _>(Arc::clone(handler))
        .register::<UpdateIdentityResource, _>(Arc::clone(handler))
        .register::<RemoveIdentityResource, _>(Arc::clone(handler))
}

#[async_trait]
impl CommandSteps<RegisterIdentityResource> for IdentityResourceCommandHandler {
    type Aggregate = IdentityResource;
    type Event = IdentityResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(
        &self,
        command: &RegisterIdentityResource,
    ) -> Result<Option<IdentityResource>, DomainError> {
        self.repository.get_resource(&command.resource.name).await
    }

    fn check(
        &self,
        _command: &RegisterIdentityResource,
        current: Option<&IdentityResource>,
    ) -> Result<(), Conflict> {
        require_absent(current, IDENTITY_RESOURCE_SUBJECT, "Resource already exists")
    }

    async fn mutate(
        &self,
        command: &RegisterIdentityResource,
        _current: Option<IdentityResource>,
    ) -> Result<(), DomainError> {
        self.repository.add(command.resource.clone()).await
    }

    fn completed(
        &self,
        command: &RegisterIdentityResource,
        context: EventContext,
    ) -> IdentityResourceEvent {
        IdentityResourceEvent::new(
            IdentityResourceEventKind::Registered(IdentityResourceRegistered {
                resource: command.resource.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<UpdateIdentityResource> for IdentityResourceCommandHandler {
    type Aggregate = IdentityResource;
    type Event = IdentityResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(
        &self,
        command: &UpdateIdentityResource,
    ) -> Result<Option<IdentityResource>, DomainError> {
        self.repository.get_resource(&command.old_name).await
    }

    fn check(
        &self,
        _command: &UpdateIdentityResource,
        current: Option<&IdentityResource>,
    ) -> Result<(), Conflict> {
        require_present(current, IDENTITY_RESOURCE_SUBJECT, "Resource not found").map(|_| ())
    }

    async fn mutate(
        &self,
        command: &UpdateIdentityResource,
        _current: Option<IdentityResource>,
    ) -> Result<(), DomainError> {
        self.repository
            .update(&command.old_name, command.resource.clone())
            .await
    }

    fn completed(
        &self,
        command: &UpdateIdentityResource,
        context: EventContext,
    ) -> IdentityResourceEvent {
        IdentityResourceEvent::new(
            IdentityResourceEventKind::Updated(IdentityResourceUpdated {
                old_name: command.old_name.clone(),
                resource: command.resource.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveIdentityResource> for IdentityResourceCommandHandler {
    type Aggregate = IdentityResource;
    type Event = IdentityResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(
        &self,
        command: &RemoveIdentityResource,
    ) -> Result<Option<IdentityResource>, DomainError> {
        self.repository.get_resource(&command.name).await
    }

    fn check(
        &self,
        _command: &RemoveIdentityResource,
        current: Option<&IdentityResource>,
    ) -> Result<(), Conflict> {
        require_present(current, IDENTITY_RESOURCE_SUBJECT, "Resource not found").map(|_| ())
    }

    async fn mutate(
        &self,
        command: &RemoveIdentityResource,
        current: Option<IdentityResource>,
    ) -> Result<(), DomainError> {
        let resource =
            current.ok_or_else(|| DomainError::AggregateNotFound(command.name.clone()))?;
        self.repository.remove(&resource).await
    }

    fn completed(
        &self,
        command: &RemoveIdentityResource,
        context: EventContext,
    ) -> IdentityResourceEvent {
        IdentityResourceEvent::new(
            IdentityResourceEventKind::Removed(IdentityResourceRemoved {
                name: command.name.clone(),
            }),
            context,
        )
    }
}
