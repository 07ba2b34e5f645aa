use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// A message pulled from a queue, not yet acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub body: Bytes,
}

impl Message {
    pub fn new(id: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("could not receive messages, got ({0})")]
    Receive(String),

    #[error("could not acknowledge message ({id}), got ({reason})")]
    Ack { id: String, reason: String },
}

/// Source of queue messages.
///
/// `receive` returns at most `max` messages and may return fewer or none;
/// an empty batch is not an error. A received message stays outstanding
/// until `ack`; whether a backend redelivers unacknowledged messages is
/// its own policy (a broker typically does, [`InMemorySubscriber`] does
/// not), so consumers must finish what they have received.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn receive(&self, max: usize) -> Result<Vec<Message>, QueueError>;

    async fn ack(&self, message: &Message) -> Result<(), QueueError>;
}

// ── In-memory backend ───────────────────────────────────────────────────────

/// Queue backend holding messages in memory, for tests and local runs.
#[derive(Default)]
pub struct InMemorySubscriber {
    pending: Mutex<VecDeque<Message>>,
    acked: Mutex<Vec<String>>,
}

impl InMemorySubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: Message) {
        self.pending
            .lock()
            .expect("queue lock poisoned")
            .push_back(message);
    }

    /// IDs acknowledged so far, in acknowledgement order.
    pub fn acked(&self) -> Vec<String> {
        self.acked.lock().expect("queue lock poisoned").clone()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().expect("queue lock poisoned").len()
    }
}

#[async_trait]
impl Subscriber for InMemorySubscriber {
    async fn receive(&self, max: usize) -> Result<Vec<Message>, QueueError> {
        let mut pending = self.pending.lock().expect("queue lock poisoned");
        let take = max.min(pending.len());
        Ok(pending.drain(..take).collect())
    }

    async fn ack(&self, message: &Message) -> Result<(), QueueError> {
        self.acked
            .lock()
            .expect("queue lock poisoned")
            .push(message.id.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn receive_honors_max_and_drains_in_order() {
        let queue = InMemorySubscriber::new();
        for i in 0..3 {
            queue.push(Message::new(format!("m{i}"), "payload"));
        }

        let batch = queue.receive(2).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, "m0");
        assert_eq!(batch[1].id, "m1");
        assert_eq!(queue.pending_len(), 1);
    }

    #[tokio::test]
    async fn empty_queue_yields_empty_batch() {
        let queue = InMemorySubscriber::new();
        assert!(queue.receive(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ack_records_message_id() {
        let queue = InMemorySubscriber::new();
        let message = Message::new("m1", "payload");
        queue.ack(&message).await.unwrap();
        assert_eq!(queue.acked(), vec!["m1".to_string()]);
    }

    #[test]
    fn errors_render_id_and_reason() {
        let err = QueueError::Ack {
            id: "m7".to_string(),
            reason: "gone".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not acknowledge message (m7), got (gone)"
        );
    }
}
