//! Shared test doubles for the identity configuration admin.

mod clock;
mod subscriber;
mod unit_of_work;

pub use clock::{FixedClock, fixed_now};
pub use subscriber::{FailingSubscriber, PublishedEvent, RecordingSubscriber, recording_publisher};
pub use unit_of_work::{CancellingUnitOfWork, RecordingUnitOfWork};
