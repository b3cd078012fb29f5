use super::PushEvent;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, Notify},
    task::JoinHandle,
};

///
/// Stream of created items delivered by [super::PushFeed].
///
/// Producers stop once the receiving side is dropped,
/// [PushSubscription::close] drops it and waits for them.
///
pub struct PushSubscription {
    events: mpsc::Receiver<PushEvent>,
    producers: Vec<JoinHandle<()>>,
    producer_failed: Arc<Notify>,
}

impl PushSubscription {
    ///
    /// `producer_failed` is notified by a producer that stopped
    /// before the subscription was closed.
    ///
    pub fn new(
        events: mpsc::Receiver<PushEvent>,
        producers: Vec<JoinHandle<()>>,
        producer_failed: Arc<Notify>,
    ) -> Self {
        Self {
            events,
            producers,
            producer_failed,
        }
    }

    ///
    /// Waits for next event.
    /// Returns None when all producers finished or any of them failed.
    /// Events buffered before the failure are delivered first.
    ///
    pub async fn recv(&mut self) -> Option<PushEvent> {
        tokio::select! {
            biased;

            event = self.events.recv() => event,

            _ = self.producer_failed.notified() => None,
        }
    }

    pub async fn close(self) {
        let Self {
            events, producers, ..
        } = self;
        drop(events);

        for producer in producers {
            if let Err(err) = producer.await {
                tracing::error!(%err, "push producer failed");
            }
        }

        tracing::debug!("push subscription closed");
    }
}
