//! Async task: reads ReactionEvent from the gateway channel and dispatches them.
//!
//! The channel is bounded; a permit is taken before each spawn so at most `workers`
//! events are in flight and the gateway handler feels backpressure when the queue fills.

use crate::domain::ReactionEvent;
use crate::usecases::ReactionDispatcher;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info};

/// Upper bound on concurrent dispatches; also keeps the drain's `acquire_many` within `u32`.
pub const MAX_WORKERS: usize = 1024;

pub struct ReactionWorker {
    dispatcher: Arc<ReactionDispatcher>,
    rx: mpsc::Receiver<ReactionEvent>,
    workers: usize,
}

impl ReactionWorker {
    pub fn new(
        dispatcher: Arc<ReactionDispatcher>,
        rx: mpsc::Receiver<ReactionEvent>,
        workers: usize,
    ) -> Self {
        Self {
            dispatcher,
            rx,
            workers: workers.clamp(1, MAX_WORKERS),
        }
    }

    /// Run the worker. Processes until the channel is closed, then waits for in-flight events.
    pub async fn run(mut self) {
        let semaphore = Arc::new(Semaphore::new(self.workers));

        while let Some(event) = self.rx.recv().await {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                error!("reaction worker semaphore closed");
                break;
            };
            let dispatcher = Arc::clone(&self.dispatcher);

            tokio::spawn(async move {
                let outcome = dispatcher.dispatch(&event).await;
                debug!(
                    user_id = event.user_id,
                    message_id = event.message_id,
                    ?outcome,
                    "reaction handled"
                );
                drop(permit);
            });
        }

        // Drain: every permit back means every spawned dispatch finished.
        let _ = semaphore.acquire_many(self.workers as u32).await;
        info!("reaction worker finished (channel closed)");
    }
}
