//! In-process mediator.
//!
//! Two halves, built once at startup and read-only afterwards:
//!
//! - [`Publisher`] fans notifications and domain events out to subscribers,
//!   sequentially and in registration order. A failing subscriber is logged
//!   and skipped; it never affects other subscribers or the command result.
//! - [`Mediator`] routes each command to the single handler registered for
//!   its type. Zero or several handlers is a wiring defect reported as
//!   [`BusError`].
//!
//! Handlers receive the publisher at construction, so the publisher is built
//! first and shared by `Arc`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::Command;
use crate::event::DomainEvent;
use crate::notification::Notification;
use crate::pipeline::CommandOutcome;

/// Wiring defects detected while dispatching a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No handler is registered for the command type.
    #[error("no handler registered for command {0}")]
    NoHandler(&'static str),

    /// More than one handler is registered for the command type.
    #[error("{count} handlers registered for command {command}; expected exactly one")]
    MultipleHandlers {
        /// The command type.
        command: &'static str,
        /// How many handlers were found.
        count: usize,
    },

    /// The registry entry does not accept the dispatched command.
    #[error("handler registry type mismatch: expected {expected}")]
    TypeMismatch {
        /// The type the registry entry was built for.
        expected: &'static str,
    },
}

/// Failure inside one subscriber. Logged by the publisher, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("subscriber failed: {0}")]
pub struct SubscriberError(pub String);

impl SubscriberError {
    /// Wraps a failure description.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Routing key of a published message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Any notification.
    Notification,
    /// A domain event of the given type.
    Event(&'static str),
}

/// A message travelling through the publisher.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    /// An expected failure.
    Notification(&'a Notification),
    /// A committed mutation.
    Event(&'a dyn DomainEvent),
}

impl Message<'_> {
    /// The routing key.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Notification(_) => MessageKind::Notification,
            Self::Event(event) => MessageKind::Event(event.event_type()),
        }
    }
}

/// What a subscriber registers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Every notification.
    Notifications,
    /// Domain events of one type.
    Event(&'static str),
    /// Every domain event.
    AllEvents,
}

impl Topic {
    /// `true` if a message of `kind` is delivered to this topic.
    #[must_use]
    pub fn matches(self, kind: MessageKind) -> bool {
        match (self, kind) {
            (Self::Notifications, MessageKind::Notification)
            | (Self::AllEvents, MessageKind::Event(_)) => true,
            (Self::Event(wanted), MessageKind::Event(actual)) => wanted == actual,
            _ => false,
        }
    }
}

/// Receives published messages.
///
/// Subscribers must tolerate repeated notification subjects within one
/// request and at-least-once delivery of events.
#[async_trait]
pub trait Subscriber: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Reacts to one message.
    async fn on_message(&self, message: &Message<'_>) -> Result<(), SubscriberError>;
}

/// Immutable subscriber table.
pub struct Publisher {
    subscriptions: Vec<(Topic, Arc<dyn Subscriber>)>,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Collects subscriptions before the publisher is frozen.
#[derive(Default)]
pub struct PublisherBuilder {
    subscriptions: Vec<(Topic, Arc<dyn Subscriber>)>,
}

impl PublisherBuilder {
    /// Registers `subscriber` for `topic`. Order of registration is order of
    /// delivery.
    #[must_use]
    pub fn subscribe(mut self, topic: Topic, subscriber: Arc<dyn Subscriber>) -> Self {
        self.subscriptions.push((topic, subscriber));
        self
    }

    /// Freezes the subscriber table.
    #[must_use]
    pub fn build(self) -> Publisher {
        Publisher {
            subscriptions: self.subscriptions,
        }
    }
}

impl Publisher {
    /// Starts an empty subscriber table.
    #[must_use]
    pub fn builder() -> PublisherBuilder {
        PublisherBuilder::default()
    }

    /// Delivers `message` to every matching subscriber in registration order.
    /// Returns how many subscribers accepted it.
    pub async fn publish(&self, message: Message<'_>) -> usize {
        let kind = message.kind();
        let mut delivered = 0;
        for (topic, subscriber) in &self.subscriptions {
            if !topic.matches(kind) {
                continue;
            }
            match subscriber.on_message(&message).await {
                Ok(()) => delivered += 1,
                Err(err) => warn!(
                    subscriber = subscriber.name(),
                    kind = ?kind,
                    error = %err,
                    "subscriber failed; continuing"
                ),
            }
        }
        debug!(kind = ?kind, delivered, "message published");
        delivered
    }

    /// Publishes a notification.
    pub async fn notify(&self, notification: &Notification) -> usize {
        self.publish(Message::Notification(notification)).await
    }

    /// Publishes a domain event.
    pub async fn raise(&self, event: &dyn DomainEvent) -> usize {
        self.publish(Message::Event(event)).await
    }
}

/// Executes one command type.
#[async_trait]
pub trait CommandHandler<C: Command>: Send + Sync {
    /// Runs the command to a terminal outcome. Never panics on business
    /// failures; see [`CommandOutcome`].
    async fn handle(&self, command: C, cancel: &CancellationToken) -> CommandOutcome;
}

type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<CommandOutcome, BusError>> + Send + 'a>>;

type HandlerFn =
    Arc<dyn for<'a> Fn(Box<dyn Any + Send>, &'a CancellationToken) -> HandlerFuture<'a> + Send + Sync>;

// Pins the closure signature to the higher-ranked form `HandlerFn` needs.
fn handler_fn<F>(f: F) -> HandlerFn
where
    F: for<'a> Fn(Box<dyn Any + Send>, &'a CancellationToken) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Routes commands to handlers by command type.
pub struct Mediator {
    handlers: HashMap<TypeId, Vec<HandlerFn>>,
    publisher: Arc<Publisher>,
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("command_types", &self.handlers.len())
            .field("publisher", &self.publisher)
            .finish()
    }
}

/// Collects handler registrations.
pub struct MediatorBuilder {
    handlers: HashMap<TypeId, Vec<HandlerFn>>,
    publisher: Arc<Publisher>,
}

impl MediatorBuilder {
    /// Registers `handler` for commands of type `C`.
    #[must_use]
    pub fn register<C, H>(mut self, handler: Arc<H>) -> Self
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let f = handler_fn(move |boxed, cancel| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                match boxed.downcast::<C>() {
                    Ok(command) => Ok(handler.handle(*command, cancel).await),
                    Err(_) => Err(BusError::TypeMismatch {
                        expected: std::any::type_name::<C>(),
                    }),
                }
            })
        });
        self.handlers.entry(TypeId::of::<C>()).or_default().push(f);
        self
    }

    /// Freezes the handler table.
    #[must_use]
    pub fn build(self) -> Mediator {
        Mediator {
            handlers: self.handlers,
            publisher: self.publisher,
        }
    }
}

impl Mediator {
    /// Starts a handler table that shares `publisher`.
    #[must_use]
    pub fn builder(publisher: Arc<Publisher>) -> MediatorBuilder {
        MediatorBuilder {
            handlers: HashMap::new(),
            publisher,
        }
    }

    /// Dispatches `command` to its single registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NoHandler`] or [`BusError::MultipleHandlers`] when
    /// the registry does not hold exactly one handler for the command type.
    pub async fn send<C: Command>(
        &self,
        command: C,
        cancel: &CancellationToken,
    ) -> Result<CommandOutcome, BusError> {
        let command_type = command.command_type();
        let handler = match self.handlers.get(&TypeId::of::<C>()).map(Vec::as_slice) {
            None | Some([]) => return Err(BusError::NoHandler(command_type)),
            Some([handler]) => Arc::clone(handler),
            Some(handlers) => {
                return Err(BusError::MultipleHandlers {
                    command: command_type,
                    count: handlers.len(),
                });
            }
        };
        handler(Box::new(command), cancel).await
    }

    /// Publishes through the shared publisher.
    pub async fn publish(&self, message: Message<'_>) -> usize {
        self.publisher.publish(message).await
    }

    /// The shared publisher.
    #[must_use]
    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }
}
