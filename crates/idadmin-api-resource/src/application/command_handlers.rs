//! Command handlers for the API resource context.
//!
//! One handler type implements [`CommandSteps`] for every command of the
//! context; the shared pipeline does the sequencing.

use std::sync::Arc;

use async_trait::async_trait;
use idadmin_core::bus::MediatorBuilder;
use idadmin_core::error::DomainError;
use idadmin_core::event::EventContext;
use idadmin_core::pipeline::{CommandPipeline, CommandSteps, Conflict, require_absent, require_present};

use crate::domain::aggregates::ApiResource;
use crate::domain::commands::{
    RegisterApiResource, RemoveApiResource, RemoveApiScope, RemoveApiSecret, SaveApiScope,
    SaveApiSecret, UpdateApiResource,
};
use crate::domain::events::{
    ApiResourceEvent, ApiResourceEventKind, ApiResourceRegistered, ApiResourceRemoved,
    ApiResourceUpdated, ApiScopeRemoved, ApiScopeSaved, ApiSecretRemoved, ApiSecretSaved,
};
use crate::domain::repository::ApiResourceRepository;

/// Notification subject for resource-level conflicts.
pub const API_SUBJECT: &str = "Api";
/// Notification subject for secret mismatches.
pub const API_SECRET_SUBJECT: &str = "Api Secret";
/// Notification subject for scope conflicts.
pub const API_SCOPE_SUBJECT: &str = "Api Scope";

/// Handles every command of the API resource context.
pub struct ApiResourceCommandHandler {
    pipeline: CommandPipeline,
    repository: Arc<dyn ApiResourceRepository>,
}

impl ApiResourceCommandHandler {
    /// Creates a handler over one unit of work's repository.
    #[must_use]
    pub fn new(pipeline: CommandPipeline, repository: Arc<dyn ApiResourceRepository>) -> Self {
        Self {
            pipeline,
            repository,
        }
    }
}

/// Registers `handler` for every API resource command.
#[must_use]
pub fn register(
    builder: MediatorBuilder,
    handler: &Arc<ApiResourceCommandHandler>,
) -> MediatorBuilder {
    builder
        .register::<RegisterApiResource, _>(Arc::clone(handler))
        .register::<UpdateApiResource, _>(Arc::clone(handler))
        .register::<RemoveApiResource, _>(Arc::clone(handler))
        .register::<SaveApiSecret, _>(Arc::clone(handler))
        .register::<RemoveApiSecret, _>(Arc::clone(handler))
        .register::<SaveApiScope, _>(Arc::clone(handler))
        .register::<RemoveApiScope, _>(Arc::clone(handler))
}

fn vanished(name: &str) -> DomainError {
    DomainError::AggregateNotFound(name.to_owned())
}

#[async_trait]
impl CommandSteps<RegisterApiResource> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RegisterApiResource) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.resource.name).await
    }

    fn check(&self, _command: &RegisterApiResource, current: Option<&ApiResource>) -> Result<(), Conflict> {
        require_absent(current, API_SUBJECT, "Resource already exists")
    }

    async fn mutate(
        &self,
        command: &RegisterApiResource,
        _current: Option<ApiResource>,
    ) -> Result<(), DomainError> {
        self.repository
            .add(command.resource.clone().into_new_resource())
            .await
    }

    fn completed(&self, command: &RegisterApiResource, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::Registered(ApiResourceRegistered {
                resource: command.resource.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<UpdateApiResource> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &UpdateApiResource) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.old_name).await
    }

    fn check(&self, _command: &UpdateApiResource, current: Option<&ApiResource>) -> Result<(), Conflict> {
        require_present(current, API_SUBJECT, "Resource not found").map(|_| ())
    }

    async fn mutate(
        &self,
        command: &UpdateApiResource,
        current: Option<ApiResource>,
    ) -> Result<(), DomainError> {
        let current = current.ok_or_else(|| vanished(&command.old_name))?;
        self.repository
            .update_with_children(&command.old_name, command.resource.clone().apply_to(current))
            .await
    }

    fn completed(&self, command: &UpdateApiResource, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::Updated(ApiResourceUpdated {
                old_name: command.old_name.clone(),
                resource: command.resource.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveApiResource> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveApiResource) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.name).await
    }

    fn check(&self, _command: &RemoveApiResource, current: Option<&ApiResource>) -> Result<(), Conflict> {
        require_present(current, API_SUBJECT, "Resource not found").map(|_| ())
    }

    async fn mutate(
        &self,
        command: &RemoveApiResource,
        current: Option<ApiResource>,
    ) -> Result<(), DomainError> {
        let current = current.ok_or_else(|| vanished(&command.name))?;
        self.repository.remove(&current).await
    }

    fn completed(&self, command: &RemoveApiResource, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::Removed(ApiResourceRemoved {
                name: command.name.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<SaveApiSecret> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveApiSecret) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.resource_name).await
    }

    fn check(&self, _command: &SaveApiSecret, current: Option<&ApiResource>) -> Result<(), Conflict> {
        require_present(current, API_SUBJECT, "Api not found").map(|_| ())
    }

    async fn mutate(&self, command: &SaveApiSecret, _current: Option<ApiResource>) -> Result<(), DomainError> {
        self.repository
            .add_secret(&command.resource_name, command.secret.to_secret())
            .await
    }

    fn completed(&self, command: &SaveApiSecret, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::SecretSaved(ApiSecretSaved {
                resource_name: command.resource_name.clone(),
                secret_type: command.secret.secret_type.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveApiSecret> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveApiSecret) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.resource_name).await
    }

    fn check(&self, command: &RemoveApiSecret, current: Option<&ApiResource>) -> Result<(), Conflict> {
        let resource = require_present(current, API_SUBJECT, "Api not found")?;
        if !resource.has_secret(&command.secret_type, &command.value) {
            return Err(Conflict::mismatch(API_SECRET_SUBJECT, "Invalid secret"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &RemoveApiSecret, _current: Option<ApiResource>) -> Result<(), DomainError> {
        self.repository
            .remove_secret(&command.resource_name, &command.secret_type, &command.value)
            .await
    }

    fn completed(&self, command: &RemoveApiSecret, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::SecretRemoved(ApiSecretRemoved {
                resource_name: command.resource_name.clone(),
                secret_type: command.secret_type.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<SaveApiScope> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &SaveApiScope) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.resource_name).await
    }

    fn check(&self, command: &SaveApiScope, current: Option<&ApiResource>) -> Result<(), Conflict> {
        let resource = require_present(current, API_SUBJECT, "Api not found")?;
        if resource.has_scope(&command.scope.name) {
            return Err(Conflict::already_exists(API_SCOPE_SUBJECT, "Scope already exists"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &SaveApiScope, _current: Option<ApiResource>) -> Result<(), DomainError> {
        self.repository
            .add_scope(&command.resource_name, command.scope.clone())
            .await
    }

    fn completed(&self, command: &SaveApiScope, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::ScopeSaved(ApiScopeSaved {
                resource_name: command.resource_name.clone(),
                scope: command.scope.clone(),
            }),
            context,
        )
    }
}

#[async_trait]
impl CommandSteps<RemoveApiScope> for ApiResourceCommandHandler {
    type Aggregate = ApiResource;
    type Event = ApiResourceEvent;

    fn pipeline(&self) -> &CommandPipeline {
        &self.pipeline
    }

    async fn load(&self, command: &RemoveApiScope) -> Result<Option<ApiResource>, DomainError> {
        self.repository.get_resource(&command.resource_name).await
    }

    fn check(&self, command: &RemoveApiScope, current: Option<&ApiResource>) -> Result<(), Conflict> {
        let resource = require_present(current, API_SUBJECT, "Api not found")?;
        // The requested scope must be one of the resource's scopes; other
        // scopes on the same resource are irrelevant.
        if !resource.has_scope(&command.name) {
            return Err(Conflict::mismatch(API_SCOPE_SUBJECT, "Invalid scope"));
        }
        Ok(())
    }

    async fn mutate(&self, command: &RemoveApiScope, _current: Option<ApiResource>) -> Result<(), DomainError> {
        self.repository
            .remove_scope(&command.resource_name, &command.name)
            .await
    }

    fn completed(&self, command: &RemoveApiScope, context: EventContext) -> ApiResourceEvent {
        ApiResourceEvent::new(
            ApiResourceEventKind::ScopeRemoved(ApiScopeRemoved {
                resource_name: command.resource_name.clone(),
                name: command.name.clone(),
            }),
            context,
        )
    }
}
