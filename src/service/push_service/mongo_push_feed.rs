use super::{PushEvent, PushFeed, PushFeedConfig, PushSubscription};
use crate::{
    dto::{AnnouncementItem, NotificationItem},
    repository::{AnnouncementFindEntity, NotificationFindEntity, ANNOUNCEMENTS, NOTIFICATIONS},
};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures_util::StreamExt;
use mongodb::{
    change_stream::{event::ChangeStreamEvent, ChangeStream},
    Database,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

///
/// Push feed built on MongoDB change streams.
/// Requires the database to run as a replica set.
///
pub struct MongoPushFeed {
    config: PushFeedConfig,
    database: Database,
}

impl MongoPushFeed {
    pub fn new(config: PushFeedConfig, database: Database) -> Self {
        Self { config, database }
    }
}

#[async_trait]
impl PushFeed for MongoPushFeed {
    async fn subscribe(&self, student_id: ObjectId) -> anyhow::Result<PushSubscription> {
        tracing::info!(%student_id, "opening change streams");

        let notifications = self
            .database
            .collection::<NotificationFindEntity>(NOTIFICATIONS)
            .watch()
            .pipeline([doc! {
                "$match": {
                    "operationType": "insert",
                    "fullDocument.student_id": student_id,
                }
            }])
            .await?;

        let announcements = self
            .database
            .collection::<AnnouncementFindEntity>(ANNOUNCEMENTS)
            .watch()
            .pipeline([doc! {
                "$match": {
                    "operationType": "insert",
                }
            }])
            .await?;

        let (tx, rx) = mpsc::channel(self.config.buffer_size);
        let producer_failed = Arc::new(Notify::new());
        let producers = vec![
            tokio::spawn(forward(
                notifications,
                tx.clone(),
                producer_failed.clone(),
                NOTIFICATIONS,
                |entity| PushEvent::NotificationCreated(NotificationItem::from(entity)),
            )),
            tokio::spawn(forward(
                announcements,
                tx,
                producer_failed.clone(),
                ANNOUNCEMENTS,
                |entity| PushEvent::AnnouncementCreated(AnnouncementItem::from(entity)),
            )),
        ];

        tracing::info!("opened change streams");

        Ok(PushSubscription::new(rx, producers, producer_failed))
    }
}

#[tracing::instrument(name = "Push Feed", skip_all, fields(collection = collection))]
async fn forward<T, F>(
    mut stream: ChangeStream<ChangeStreamEvent<T>>,
    tx: mpsc::Sender<PushEvent>,
    producer_failed: Arc<Notify>,
    collection: &'static str,
    into_event: F,
) where
    T: DeserializeOwned + Unpin + Send + Sync,
    F: Fn(T) -> PushEvent,
{
    loop {
        let event = tokio::select! {
            biased;

            // Subscription closed
            _ = tx.closed() => break,

            event = stream.next() => event,
        };

        match event {
            Some(Ok(event)) => {
                let Some(document) = event.full_document else {
                    tracing::warn!("insert event without document");
                    continue;
                };

                tracing::debug!("received inserted document");
                if tx.send(into_event(document)).await.is_err() {
                    break;
                }
            }
            Some(Err(err)) => {
                tracing::warn!(%err, "change stream failed");
                producer_failed.notify_one();
                break;
            }
            None => {
                tracing::warn!("change stream ended");
                producer_failed.notify_one();
                break;
            }
        }
    }

    tracing::debug!("push feed stopped");
}
