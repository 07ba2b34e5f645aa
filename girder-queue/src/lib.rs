//! Queue consumption for girder workers.
//!
//! A [`Subscriber`] abstracts the queue backend; the [`Consumer`] owns the
//! polling loop, acknowledging messages the handler processed successfully
//! and backing off while the queue is empty.

pub mod consumer;
pub mod subscriber;

pub use consumer::{Consumer, StopHandle};
pub use subscriber::{InMemorySubscriber, Message, QueueError, Subscriber};
