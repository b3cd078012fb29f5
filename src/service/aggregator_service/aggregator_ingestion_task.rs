use super::aggregator_state::AggregatorState;
use crate::{
    dto::{ItemKind, PushStatus},
    service::push_service::{PushEvent, PushSubscription},
};
use bson::oid::ObjectId;
use std::sync::Arc;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};

///
/// Applies pushed items to the view of a single generation
///
pub struct AggregatorIngestionTask {
    state: Arc<Mutex<AggregatorState>>,
    subscription: PushSubscription,

    generation: u64,

    /// Resolved when subscription was created, never looked up per event
    student_id: ObjectId,
}

impl AggregatorIngestionTask {
    pub fn new(
        state: Arc<Mutex<AggregatorState>>,
        subscription: PushSubscription,
        generation: u64,
        student_id: ObjectId,
    ) -> Self {
        Self {
            state,
            subscription,
            generation,
            student_id,
        }
    }

    #[tracing::instrument(
        name = "Push Ingestion",
        skip_all,
        fields(
            generation = self.generation,
            student_id = %self.student_id,
        )
    )]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        loop {
            let event = tokio::select! {
                biased;

                // Wait for signal to close
                _ = close_notify.notified() => break,

                event = self.subscription.recv() => event,
            };

            let Some(event) = event else {
                tracing::warn!("push feed ended, view changes only on refresh");
                let mut state = self.state.lock().await;
                if state.is_current(self.generation) {
                    state.view.push_status = PushStatus::Degraded;
                    state.publish();
                }
                break;
            };

            if !self.ingest(event).await {
                tracing::debug!("identity changed");
                break;
            }
        }

        self.subscription.close().await;
    }

    ///
    /// ### Returns
    /// false when generation is no longer current
    ///
    async fn ingest(&self, event: PushEvent) -> bool {
        let mut state = self.state.lock().await;
        if !state.is_current(self.generation) {
            return false;
        }

        let applied = match event {
            PushEvent::NotificationCreated(notification) => {
                if notification.student_id != self.student_id {
                    tracing::trace!(id = %notification.id, "notification of other student");
                    false
                } else if state.is_hidden(notification.id, ItemKind::Notification) {
                    tracing::trace!(id = %notification.id, "notification hidden");
                    false
                } else {
                    state.record_pushed_notification(&notification);
                    state.view.prepend_notification(notification)
                }
            }
            PushEvent::AnnouncementCreated(announcement) => {
                if state.is_hidden(announcement.id, ItemKind::Announcement) {
                    tracing::trace!(id = %announcement.id, "announcement hidden");
                    false
                } else {
                    state.record_pushed_announcement(&announcement);
                    state.view.prepend_announcement(announcement)
                }
            }
        };

        if applied {
            tracing::info!(unread_count = state.view.unread_count, "added pushed item");
            state.publish();
        }

        true
    }
}

pub struct AggregatorIngestionHandle {
    generation: u64,
    close_notify: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl AggregatorIngestionHandle {
    pub fn spawn(task: AggregatorIngestionTask) -> Self {
        let generation = task.generation;
        let close_notify = Arc::new(Notify::new());
        let handle = tokio::spawn(task.run(close_notify.clone()));

        Self {
            generation,
            close_notify,
            handle,
        }
    }

    ///
    /// Ingestion is running for the generation
    ///
    pub fn is_live(&self, generation: u64) -> bool {
        self.generation == generation && !self.handle.is_finished()
    }

    pub async fn close(self) {
        self.close_notify.notify_one();
        if let Err(err) = self.handle.await {
            tracing::error!(%err, "push ingestion task failed");
        }
    }
}
