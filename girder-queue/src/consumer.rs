use crate::subscriber::{Message, Subscriber};
use girder_core::settings::QueueConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Polling loop over a [`Subscriber`].
///
/// Each iteration pulls up to `max_messages`, runs the handler per message
/// and acknowledges the ones that succeed. An empty batch backs off for
/// `sleep_interval_ms`. A stop request interrupts waiting — the receive
/// call and the backoff — but never a batch in flight: messages already
/// received are handled and acknowledged before the loop exits.
pub struct Consumer<S> {
    subscriber: Arc<S>,
    config: QueueConfig,
    shutdown: Arc<Notify>,
}

/// Signals a running [`Consumer`] to stop. Firing before the loop starts
/// still stops it on the first iteration.
#[derive(Clone)]
pub struct StopHandle {
    shutdown: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        info!("Stopping queue");
        self.shutdown.notify_one();
    }
}

impl<S: Subscriber> Consumer<S> {
    pub fn new(subscriber: Arc<S>, config: QueueConfig) -> Self {
        Self {
            subscriber,
            config,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    pub async fn run<F, Fut>(&self, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        info!(queue = %self.config.name, "Queue consumer started");
        loop {
            // Only the waits race against shutdown. Once a batch is out of
            // the subscriber it is handled to completion, otherwise stopping
            // would drop received-but-unacked messages on the floor.
            let received = tokio::select! {
                _ = self.shutdown.notified() => break,
                result = self.subscriber.receive(self.config.max_messages) => result,
            };
            let batch = match received {
                Ok(batch) => batch,
                Err(e) => {
                    error!(error = %e, "Could not receive messages");
                    if self.backoff().await {
                        break;
                    }
                    continue;
                }
            };
            if batch.is_empty() {
                if self.backoff().await {
                    break;
                }
                continue;
            }
            for message in batch {
                let id = message.id.clone();
                match handler(message.clone()).await {
                    Ok(()) => {
                        if let Err(e) = self.subscriber.ack(&message).await {
                            warn!(id = %id, error = %e, "Could not acknowledge message");
                        }
                    }
                    Err(e) => {
                        warn!(id = %id, error = %e, "Message handler failed, leaving unacknowledged");
                    }
                }
            }
        }
        info!("Queue stopped");
    }

    /// Sleeps the empty-queue interval; true when shutdown fired first.
    async fn backoff(&self) -> bool {
        tokio::select! {
            _ = self.shutdown.notified() => true,
            () = sleep(Duration::from_millis(self.config.sleep_interval_ms)) => false,
        }
    }
}
