use girder_core::{App, Settings};
use girder_queue::{Consumer, InMemorySubscriber, Message};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Runs the example queue worker against an in-memory queue seeded with a
/// few messages, then waits for shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let queue = Arc::new(InMemorySubscriber::new());
    for i in 0..5 {
        queue.push(Message::new(
            format!("demo-{i}"),
            format!("example payload {i}"),
        ));
    }

    let consumer = Consumer::new(queue, settings.queue.clone());
    let stop = consumer.stop_handle();

    let task: Arc<Mutex<Option<JoinHandle<()>>>> = Arc::new(Mutex::new(None));
    let start_slot = task.clone();
    let stop_slot = task;

    App::new(settings.app.name.clone())
        .lifecycle(
            "queue-consumer",
            move || async move {
                let worker = tokio::spawn(async move {
                    consumer
                        .run(|message| async move {
                            let body = String::from_utf8_lossy(&message.body).into_owned();
                            info!(id = %message.id, body = %body, "Got message");
                            Ok(())
                        })
                        .await;
                });
                *start_slot.lock().await = Some(worker);
                Ok(())
            },
            move || async move {
                stop.stop();
                if let Some(worker) = stop_slot.lock().await.take() {
                    worker.await?;
                }
                Ok(())
            },
        )
        .run()
        .await
}
