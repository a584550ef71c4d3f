//! The shared command protocol.
//!
//! [`CommandPipeline::run`] owns the sequencing every mutating command
//! follows:
//!
//! 1. validate the command against its own rules;
//! 2. load the current aggregate by natural key;
//! 3. check existence and child-membership conflicts;
//! 4. mutate through the repository;
//! 5. commit the unit of work;
//! 6. publish exactly one domain event.
//!
//! Handlers supply only the aggregate-specific parts through
//! [`CommandSteps`]. Expected failures become notifications and a
//! `Rejected` outcome; nothing in here panics or returns an error for them.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::bus::{CommandHandler, Publisher};
use crate::clock::Clock;
use crate::command::Command;
use crate::error::DomainError;
use crate::event::{DomainEvent, EventContext};
use crate::notification::Notification;
use crate::unit_of_work::UnitOfWork;

/// Terminal state of one command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Committed; one domain event published.
    Completed,
    /// Invalid or conflicting; notifications published, nothing mutated.
    Rejected,
    /// Repository error or commit rejected by the store; nothing published.
    Failed,
    /// Cancelled before commit completed; nothing published.
    Cancelled,
}

impl CommandOutcome {
    /// The boolean result callers see: `true` only for `Completed`.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl From<CommandOutcome> for bool {
    fn from(outcome: CommandOutcome) -> Self {
        outcome.is_success()
    }
}

/// Why a command conflicts with persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// A creation command targets a key that is taken.
    AlreadyExists,
    /// The target aggregate does not exist.
    NotFound,
    /// The referenced child does not belong to the aggregate.
    Mismatch,
}

/// A business-invariant violation, reported as one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Classification.
    pub kind: ConflictKind,
    /// Notification subject.
    pub subject: &'static str,
    /// Notification message.
    pub message: String,
}

impl Conflict {
    /// The key is already taken.
    #[must_use]
    pub fn already_exists(subject: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ConflictKind::AlreadyExists,
            subject,
            message: message.into(),
        }
    }

    /// The target is absent.
    #[must_use]
    pub fn not_found(subject: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ConflictKind::NotFound,
            subject,
            message: message.into(),
        }
    }

    /// The referenced child is not part of the aggregate.
    #[must_use]
    pub fn mismatch(subject: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: ConflictKind::Mismatch,
            subject,
            message: message.into(),
        }
    }

    fn into_notification(self, correlation_id: Uuid) -> Notification {
        Notification::new(correlation_id, self.subject, self.message)
    }
}

/// Fails with [`ConflictKind::AlreadyExists`] when `current` is present.
///
/// # Errors
///
/// Returns the conflict when a record already exists.
pub fn require_absent<A>(
    current: Option<&A>,
    subject: &'static str,
    message: &str,
) -> Result<(), Conflict> {
    match current {
        Some(_) => Err(Conflict::already_exists(subject, message)),
        None => Ok(()),
    }
}

/// Fails with [`ConflictKind::NotFound`] when `current` is absent.
///
/// # Errors
///
/// Returns the conflict when no record exists.
pub fn require_present<'a, A>(
    current: Option<&'a A>,
    subject: &'static str,
    message: &str,
) -> Result<&'a A, Conflict> {
    current.ok_or_else(|| Conflict::not_found(subject, message))
}

/// The aggregate-specific parts of the protocol for command `C`.
///
/// Every `CommandSteps` implementation is a [`CommandHandler`] through a
/// blanket impl that runs it on [`CommandSteps::pipeline`].
#[async_trait]
pub trait CommandSteps<C: Command>: Send + Sync {
    /// What `load` returns.
    type Aggregate: Send + Sync;
    /// The event published after a successful commit.
    type Event: DomainEvent + 'static;

    /// The pipeline this handler runs on.
    fn pipeline(&self) -> &CommandPipeline;

    /// Loads current state by the command's natural key.
    async fn load(&self, command: &C) -> Result<Option<Self::Aggregate>, DomainError>;

    /// Existence and child-membership checks. Must not mutate.
    fn check(&self, command: &C, current: Option<&Self::Aggregate>) -> Result<(), Conflict>;

    /// Stages the mutation. Durability comes only from the later commit.
    async fn mutate(&self, command: &C, current: Option<Self::Aggregate>) -> Result<(), DomainError>;

    /// Builds the completion event.
    fn completed(&self, command: &C, context: EventContext) -> Self::Event;
}

#[async_trait]
impl<C, S> CommandHandler<C> for S
where
    C: Command,
    S: CommandSteps<C>,
{
    async fn handle(&self, command: C, cancel: &CancellationToken) -> CommandOutcome {
        self.pipeline().run(self, &command, cancel).await
    }
}

/// Runs [`CommandSteps`] against one unit of work and one publisher.
#[derive(Clone)]
pub struct CommandPipeline {
    unit_of_work: Arc<dyn UnitOfWork>,
    publisher: Arc<Publisher>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for CommandPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPipeline")
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

impl CommandPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        unit_of_work: Arc<dyn UnitOfWork>,
        publisher: Arc<Publisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            unit_of_work,
            publisher,
            clock,
        }
    }

    /// The publisher notifications and events go to.
    #[must_use]
    pub fn publisher(&self) -> &Arc<Publisher> {
        &self.publisher
    }

    /// Executes `command` through `steps`.
    #[instrument(
        skip_all,
        fields(
            command_type = command.command_type(),
            correlation_id = %command.correlation_id(),
        )
    )]
    pub async fn run<C, S>(&self, steps: &S, command: &C, cancel: &CancellationToken) -> CommandOutcome
    where
        C: Command,
        S: CommandSteps<C> + ?Sized,
    {
        let correlation_id = command.correlation_id();

        let validation = command.validate();
        if !validation.is_valid() {
            debug!(errors = validation.errors().len(), "command failed validation");
            for failure in validation.errors() {
                let notification =
                    Notification::new(correlation_id, failure.field, failure.message.clone());
                self.publisher.notify(&notification).await;
            }
            return CommandOutcome::Rejected;
        }

        let current = match until_cancelled(cancel, steps.load(command)).await {
            None => return Self::cancelled("load"),
            Some(Err(err)) => {
                error!(error = %err, "failed to load aggregate");
                return CommandOutcome::Failed;
            }
            Some(Ok(current)) => current,
        };

        if let Err(conflict) = steps.check(command, current.as_ref()) {
            info!(
                subject = conflict.subject,
                kind = ?conflict.kind,
                message = %conflict.message,
                "command rejected"
            );
            self.publisher
                .notify(&conflict.into_notification(correlation_id))
                .await;
            return CommandOutcome::Rejected;
        }

        match until_cancelled(cancel, steps.mutate(command, current)).await {
            None => return Self::cancelled("mutate"),
            Some(Err(err)) => {
                error!(error = %err, "repository mutation failed");
                return CommandOutcome::Failed;
            }
            Some(Ok(())) => {}
        }

        let Some(committed) = until_cancelled(cancel, self.unit_of_work.commit()).await else {
            return Self::cancelled("commit");
        };
        if !committed {
            warn!("unit of work rejected the commit");
            return CommandOutcome::Failed;
        }

        let event = steps.completed(
            command,
            EventContext {
                correlation_id,
                occurred_at: self.clock.now(),
            },
        );
        info!(
            event_type = event.event_type(),
            aggregate_id = event.aggregate_id(),
            "command completed"
        );
        self.publisher.raise(&event).await;
        CommandOutcome::Completed
    }

    fn cancelled(stage: &'static str) -> CommandOutcome {
        info!(stage, "command cancelled");
        CommandOutcome::Cancelled
    }
}

/// Resolves to `None` if `cancel` fires before `future` completes.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, future: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        output = future => Some(output),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, TimeZone, Utc};
    use serde::Serialize;

    use super::*;
    use crate::bus::{Message, Subscriber, SubscriberError, Topic};
    use crate::event::EventMetadata;
    use crate::validation::{ValidationResult, Validator, checks};

    #[derive(Debug)]
    struct RenameWidget {
        correlation_id: Uuid,
        name: String,
    }

    impl Command for RenameWidget {
        fn command_type(&self) -> &'static str {
            "test.rename_widget"
        }

        fn correlation_id(&self) -> Uuid {
            self.correlation_id
        }

        fn validate(&self) -> ValidationResult {
            Validator::new()
                .rule("Name", "Name is required", |c: &Self| {
                    checks::not_blank(&c.name)
                })
                .rule("Name", "Name must not contain spaces", |c: &Self| {
                    !c.name.contains(' ')
                })
                .validate(self)
        }
    }

    #[derive(Debug, Serialize)]
    struct WidgetRenamed {
        name: String,
    }

    #[derive(Debug)]
    struct WidgetEvent {
        metadata: EventMetadata,
        kind: WidgetRenamed,
    }

    impl DomainEvent for WidgetEvent {
        fn event_type(&self) -> &'static str {
            "test.widget_renamed"
        }

        fn to_payload(&self) -> serde_json::Value {
            serde_json::to_value(&self.kind).unwrap_or_default()
        }

        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    struct ScriptedUnitOfWork {
        result: bool,
        commits: AtomicUsize,
        cancel_on_commit: Option<CancellationToken>,
    }

    #[async_trait]
    impl UnitOfWork for ScriptedUnitOfWork {
        async fn commit(&self) -> bool {
            self.commits.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_commit {
                token.cancel();
                std::future::pending::<()>().await;
            }
            self.result
        }
    }

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Subscriber for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn on_message(&self, message: &Message<'_>) -> Result<(), SubscriberError> {
            let entry = match message {
                Message::Notification(n) => ("notification".to_owned(), n.subject.clone()),
                Message::Event(e) => (e.event_type().to_owned(), e.aggregate_id().to_owned()),
            };
            self.messages.lock().unwrap().push(entry);
            Ok(())
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    struct WidgetHandler {
        pipeline: CommandPipeline,
        existing: Option<String>,
        fail_load: bool,
        loads: AtomicUsize,
        mutations: AtomicUsize,
    }

    #[async_trait]
    impl CommandSteps<RenameWidget> for WidgetHandler {
        type Aggregate = String;
        type Event = WidgetEvent;

        fn pipeline(&self) -> &CommandPipeline {
            &self.pipeline
        }

        async fn load(&self, _command: &RenameWidget) -> Result<Option<String>, DomainError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                return Err(DomainError::Infrastructure("connection refused".into()));
            }
            Ok(self.existing.clone())
        }

        fn check(&self, _command: &RenameWidget, current: Option<&String>) -> Result<(), Conflict> {
            require_present(current, "Widget", "Widget not found").map(|_| ())
        }

        async fn mutate(
            &self,
            _command: &RenameWidget,
            _current: Option<String>,
        ) -> Result<(), DomainError> {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn completed(&self, command: &RenameWidget, context: EventContext) -> WidgetEvent {
            WidgetEvent {
                metadata: EventMetadata::new("test.widget_renamed", &command.name, context),
                kind: WidgetRenamed {
                    name: command.name.clone(),
                },
            }
        }
    }

    struct Fixture {
        handler: WidgetHandler,
        unit_of_work: Arc<ScriptedUnitOfWork>,
        recorder: Arc<Recorder>,
    }

    fn fixture(existing: Option<&str>, commit_result: bool) -> Fixture {
        fixture_with(existing, commit_result, None, false)
    }

    fn fixture_with(
        existing: Option<&str>,
        commit_result: bool,
        cancel_on_commit: Option<CancellationToken>,
        fail_load: bool,
    ) -> Fixture {
        let recorder = Arc::new(Recorder::default());
        let publisher = Arc::new(
            Publisher::builder()
                .subscribe(Topic::Notifications, recorder.clone())
                .subscribe(Topic::AllEvents, recorder.clone())
                .build(),
        );
        let unit_of_work = Arc::new(ScriptedUnitOfWork {
            result: commit_result,
            commits: AtomicUsize::new(0),
            cancel_on_commit,
        });
        let clock = Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let handler = WidgetHandler {
            pipeline: CommandPipeline::new(unit_of_work.clone(), publisher, clock),
            existing: existing.map(str::to_owned),
            fail_load,
            loads: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
        };
        Fixture {
            handler,
            unit_of_work,
            recorder,
        }
    }

    fn rename(name: &str) -> RenameWidget {
        RenameWidget {
            correlation_id: Uuid::new_v4(),
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_successful_command_commits_once_and_publishes_one_event() {
        // Arrange
        let f = fixture(Some("old"), true);

        // Act
        let outcome = f
            .handler
            .handle(rename("new"), &CancellationToken::new())
            .await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Completed);
        assert!(bool::from(outcome));
        assert_eq!(f.handler.mutations.load(Ordering::SeqCst), 1);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 1);
        assert_eq!(
            f.recorder.messages.lock().unwrap().as_slice(),
            [("test.widget_renamed".to_owned(), "new".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_invalid_command_notifies_each_error_and_never_loads() {
        // Arrange
        let f = fixture(Some("old"), true);

        // Act
        let outcome = f
            .handler
            .handle(rename(" "), &CancellationToken::new())
            .await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.handler.loads.load(Ordering::SeqCst), 0);
        assert_eq!(f.handler.mutations.load(Ordering::SeqCst), 0);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 0);
        let messages = f.recorder.messages.lock().unwrap().clone();
        assert_eq!(messages.len(), 2);
        assert!(
            messages
                .iter()
                .all(|(kind, subject)| kind == "notification" && subject == "Name")
        );
    }

    #[tokio::test]
    async fn test_conflict_notifies_once_and_never_mutates() {
        let f = fixture(None, true);

        let outcome = f
            .handler
            .handle(rename("new"), &CancellationToken::new())
            .await;

        assert_eq!(outcome, CommandOutcome::Rejected);
        assert_eq!(f.handler.mutations.load(Ordering::SeqCst), 0);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 0);
        assert_eq!(
            f.recorder.messages.lock().unwrap().as_slice(),
            [("notification".to_owned(), "Widget".to_owned())]
        );
    }

    #[tokio::test]
    async fn test_rejected_commit_publishes_nothing() {
        let f = fixture(Some("old"), false);

        let outcome = f
            .handler
            .handle(rename("new"), &CancellationToken::new())
            .await;

        assert_eq!(outcome, CommandOutcome::Failed);
        assert!(!bool::from(outcome));
        assert_eq!(f.handler.mutations.load(Ordering::SeqCst), 1);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 1);
        assert!(f.recorder.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_ends_without_commit_or_notification() {
        let f = fixture_with(Some("old"), true, None, true);

        let outcome = f
            .handler
            .handle(rename("new"), &CancellationToken::new())
            .await;

        assert_eq!(outcome, CommandOutcome::Failed);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 0);
        assert!(f.recorder.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_touches_nothing() {
        let f = fixture(Some("old"), true);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = f.handler.handle(rename("new"), &cancel).await;

        assert_eq!(outcome, CommandOutcome::Cancelled);
        assert_eq!(f.handler.mutations.load(Ordering::SeqCst), 0);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 0);
        assert!(f.recorder.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_during_commit_publishes_no_event() {
        // Arrange
        let cancel = CancellationToken::new();
        let f = fixture_with(Some("old"), true, Some(cancel.clone()), false);

        // Act
        let outcome = f.handler.handle(rename("new"), &cancel).await;

        // Assert
        assert_eq!(outcome, CommandOutcome::Cancelled);
        assert_eq!(f.unit_of_work.commits.load(Ordering::SeqCst), 1);
        assert!(f.recorder.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_require_helpers() {
        assert_eq!(
            require_absent(Some(&1), "Api", "Resource already exists")
                .unwrap_err()
                .kind,
            ConflictKind::AlreadyExists
        );
        assert!(require_absent::<i32>(None, "Api", "x").is_ok());
        assert_eq!(require_present(Some(&1), "Api", "x"), Ok(&1));
        assert_eq!(
            require_present::<i32>(None, "Api", "Resource not found")
                .unwrap_err()
                .kind,
            ConflictKind::NotFound
        );
    }
}
