//! Shared test doubles for the Trailhunt scavenger-hunt engine.

mod clock;
mod decoder;
mod messenger;

pub use clock::{FixedClock, fixed_now};
pub use decoder::{FailingDecoder, StubDecoder};
pub use messenger::{Delivery, FailingMessenger, RecordingMessenger, SentMessage};
