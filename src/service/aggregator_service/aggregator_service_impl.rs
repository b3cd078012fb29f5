use super::{
    aggregator_ingestion_task::{AggregatorIngestionHandle, AggregatorIngestionTask},
    aggregator_resort_task::AggregatorResortTask,
    aggregator_state::{AggregatorState, Snapshot},
    AggregatorService, AggregatorServiceConfig,
};
use crate::{
    dto::{AggregatedView, HiddenItem, Identity, ItemKind, PushStatus},
    error::Error,
    repository::{
        self, AnnouncementsRepository, NotificationsRepository, OverlaysRepository,
        StudentsRepository,
    },
    retry::retry,
    service::push_service::{PushFeed, PushSubscription},
};
use anyhow::anyhow;
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::{collections::HashSet, future::Future, sync::Arc, time::Duration};
use tokio::{
    sync::{watch, Mutex, Notify},
    task::JoinHandle,
};
use uuid::Uuid;

pub struct AggregatorServiceImpl {
    config: AggregatorServiceConfig,

    students_repository: Arc<dyn StudentsRepository>,
    notifications_repository: Arc<dyn NotificationsRepository>,
    announcements_repository: Arc<dyn AnnouncementsRepository>,
    overlays_repository: Arc<dyn OverlaysRepository>,
    push_feed: Arc<dyn PushFeed>,

    state: Arc<Mutex<AggregatorState>>,
    view_rx: watch::Receiver<AggregatedView>,

    ingestion: Mutex<Option<AggregatorIngestionHandle>>,

    resort_close_notify: Arc<Notify>,
    resort_handle: Mutex<Option<JoinHandle<()>>>,
}

enum PushSetup {
    AlreadyLive,
    Subscribed(PushSubscription),
    Failed,
}

impl AggregatorServiceImpl {
    pub fn new(
        config: AggregatorServiceConfig,
        students_repository: Arc<dyn StudentsRepository>,
        notifications_repository: Arc<dyn NotificationsRepository>,
        announcements_repository: Arc<dyn AnnouncementsRepository>,
        overlays_repository: Arc<dyn OverlaysRepository>,
        push_feed: Arc<dyn PushFeed>,
    ) -> Self {
        let (state, view_rx) = AggregatorState::new();
        let state = Arc::new(Mutex::new(state));

        let resort_close_notify = Arc::new(Notify::new());
        let resort_task = AggregatorResortTask::new(config.resort_interval, state.clone());
        let resort_handle = tokio::spawn(resort_task.run(resort_close_notify.clone()));

        Self {
            config,
            students_repository,
            notifications_repository,
            announcements_repository,
            overlays_repository,
            push_feed,
            state,
            view_rx,
            ingestion: Mutex::new(None),
            resort_close_notify,
            resort_handle: Mutex::new(Some(resort_handle)),
        }
    }

    ///
    /// Stops background tasks. View stays readable.
    ///
    pub async fn close(&self) {
        tracing::info!("closing push ingestion");
        self.close_ingestion().await;

        tracing::info!("closing resort task");
        self.resort_close_notify.notify_one();
        if let Some(handle) = self.resort_handle.lock().await.take() {
            if let Err(err) = handle.await {
                tracing::error!(%err, "resort task failed");
            }
        }
    }

    async fn fetch_and_apply(&self, generation: u64, identity: &Identity) -> Result<(), Error> {
        let student_id = self.retry_read(|| self.find_student_id(identity)).await?;

        let push_setup = self.setup_push(generation, student_id).await;

        let snapshot = match self
            .retry_read(|| self.fetch(identity.user_id, student_id))
            .await
        {
            Ok(snapshot) => snapshot,
            Err(err) => {
                if let PushSetup::Subscribed(subscription) = push_setup {
                    subscription.close().await;
                }
                return Err(err);
            }
        };

        {
            let mut state = self.state.lock().await;
            if !state.is_current(generation) {
                drop(state);
                if let PushSetup::Subscribed(subscription) = push_setup {
                    subscription.close().await;
                }
                return Err(Error::IdentityChanged);
            }

            let push_status = match push_setup {
                PushSetup::AlreadyLive => state.view.push_status,
                PushSetup::Subscribed(_) => PushStatus::Live,
                PushSetup::Failed => PushStatus::Degraded,
            };

            state.student_id = Some(student_id);
            state.apply_snapshot(snapshot, push_status);
            state.finish_load(generation);
            state.publish();

            tracing::info!(
                notifications = state.view.notifications.len(),
                announcements = state.view.announcements.len(),
                unread_count = state.view.unread_count,
                "loaded view"
            );
        }

        if let PushSetup::Subscribed(subscription) = push_setup {
            self.start_ingestion(generation, student_id, subscription)
                .await;
        }

        Ok(())
    }

    async fn find_student_id(&self, identity: &Identity) -> Result<ObjectId, Error> {
        let index_number = identity.profile_lookup_key();

        with_timeout(
            self.config.request_timeout,
            self.students_repository
                .find_id_by_index_number(index_number),
        )
        .await
        .map_err(Error::Network)?
        .ok_or(Error::NotFound("student profile"))
    }

    async fn fetch(&self, user_id: Uuid, student_id: ObjectId) -> Result<Snapshot, Error> {
        let timeout = self.config.request_timeout;

        let hidden = with_timeout(timeout, self.overlays_repository.find_hidden(user_id))
            .await
            .map_err(Error::Network)?
            .into_iter()
            .collect::<HashSet<_>>();

        let (hidden_announcement_ids, hidden_notification_ids): (
            Vec<&HiddenItem>,
            Vec<&HiddenItem>,
        ) = hidden
            .iter()
            .partition(|hidden_item| hidden_item.kind.is_announcement());
        let hidden_notification_ids = hidden_notification_ids
            .into_iter()
            .map(|hidden_item| hidden_item.item_id)
            .collect::<Vec<_>>();
        let hidden_announcement_ids = hidden_announcement_ids
            .into_iter()
            .map(|hidden_item| hidden_item.item_id)
            .collect::<Vec<_>>();

        let (notifications, announcements, read_announcement_ids) = tokio::try_join!(
            with_timeout(
                timeout,
                self.notifications_repository
                    .find_many(student_id, &hidden_notification_ids),
            ),
            with_timeout(
                timeout,
                self.announcements_repository
                    .find_many(&hidden_announcement_ids),
            ),
            with_timeout(
                timeout,
                self.overlays_repository.find_read_announcement_ids(user_id),
            ),
        )
        .map_err(Error::Network)?;

        Ok(Snapshot {
            hidden,
            notifications,
            announcements,
            read_announcement_ids,
        })
    }

    async fn retry_read<T, F, Fut>(&self, async_fn: F) -> Result<T, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        retry(
            self.config.load_retry_max_count,
            self.config.load_retry_interval,
            |err: &Error| matches!(err, Error::Network(_)),
            |attempt, err: &Error| tracing::warn!(attempt, %err, "read failed"),
            async_fn,
        )
        .await
    }

    async fn setup_push(&self, generation: u64, student_id: ObjectId) -> PushSetup {
        {
            let ingestion = self.ingestion.lock().await;
            if let Some(handle) = ingestion.as_ref() {
                if handle.is_live(generation) {
                    return PushSetup::AlreadyLive;
                }
            }
        }

        let subscribe_result =
            tokio::time::timeout(self.config.request_timeout, self.push_feed.subscribe(student_id))
                .await
                .unwrap_or_else(|_| Err(anyhow!("subscribe timed out")));

        match subscribe_result {
            Ok(subscription) => PushSetup::Subscribed(subscription),
            Err(err) => {
                let err = Error::Subscription(err);
                tracing::warn!(%err, "push unavailable, view changes only on refresh");
                PushSetup::Failed
            }
        }
    }

    async fn start_ingestion(
        &self,
        generation: u64,
        student_id: ObjectId,
        subscription: PushSubscription,
    ) {
        let mut ingestion = self.ingestion.lock().await;

        let already_live = ingestion
            .as_ref()
            .is_some_and(|handle| handle.is_live(generation));
        let is_current = self.state.lock().await.is_current(generation);
        if already_live || !is_current {
            drop(ingestion);
            subscription.close().await;
            return;
        }

        if let Some(previous) = ingestion.take() {
            previous.close().await;
        }

        let task =
            AggregatorIngestionTask::new(self.state.clone(), subscription, generation, student_id);
        *ingestion = Some(AggregatorIngestionHandle::spawn(task));

        tracing::info!("started push ingestion");
    }

    async fn close_ingestion(&self) {
        let handle = self.ingestion.lock().await.take();
        if let Some(handle) = handle {
            handle.close().await;
        }
    }

    ///
    /// Captures generation and user of the current session
    ///
    async fn session(&self) -> Result<(u64, Uuid), Error> {
        let state = self.state.lock().await;
        let user_id = state.user_id()?;

        Ok((state.generation, user_id))
    }
}

#[async_trait]
impl AggregatorService for AggregatorServiceImpl {
    async fn load(&self, identity: Identity) -> Result<(), Error> {
        tracing::info!(user_id = %identity.user_id, "loading view");

        let (generation, identity_changed) = {
            let mut state = self.state.lock().await;
            state.begin_load(&identity)
        };

        if identity_changed {
            self.close_ingestion().await;
        }

        let result = self.fetch_and_apply(generation, &identity).await;

        if let Err(err) = &result {
            tracing::warn!(%err, "failed to load view");

            let mut state = self.state.lock().await;
            if state.finish_load(generation) {
                state.publish();
            }
        }

        result
    }

    async fn refresh(&self) -> Result<(), Error> {
        let identity = {
            let state = self.state.lock().await;
            state.identity.clone().ok_or(Error::NoIdentity)?
        };

        self.load(identity).await
    }

    async fn clear(&self) {
        tracing::info!("clearing view");

        self.state.lock().await.reset();
        self.close_ingestion().await;
    }

    async fn mark_read(&self, id: ObjectId, kind: ItemKind) -> Result<(), Error> {
        tracing::info!(%id, kind = kind.as_ref(), "marking as read");

        let (generation, user_id) = {
            let state = self.state.lock().await;
            let user_id = state.user_id()?;
            if !state.view.contains(id, kind) {
                return Err(Error::NotFound(kind.into()));
            }

            (state.generation, user_id)
        };

        let timeout = self.config.request_timeout;
        let write_result = match kind {
            ItemKind::Notification => {
                with_timeout(timeout, self.notifications_repository.update_read(id)).await
            }
            ItemKind::Announcement => {
                with_timeout(timeout, self.overlays_repository.insert_reads(user_id, &[id])).await
            }
        };

        if let Err(err) = write_result {
            let err = match err {
                repository::Error::NoDocumentUpdated => Error::NotFound(kind.into()),
                err => Error::Write(err),
            };
            tracing::warn!(%err, "failed to mark as read");
            return Err(err);
        }

        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            return Err(Error::IdentityChanged);
        }

        if state.view.mark_read(id, kind) {
            state.publish();
        }

        tracing::info!(unread_count = state.view.unread_count, "marked as read");

        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), Error> {
        tracing::info!("marking all as read");

        let (generation, user_id, notification_ids, announcement_ids) = {
            let state = self.state.lock().await;
            let user_id = state.user_id()?;
            let (notification_ids, announcement_ids) = state.view.unread_ids();

            (state.generation, user_id, notification_ids, announcement_ids)
        };

        if notification_ids.is_empty() && announcement_ids.is_empty() {
            tracing::info!("nothing to mark");
            return Ok(());
        }

        let timeout = self.config.request_timeout;
        if !notification_ids.is_empty() {
            with_timeout(
                timeout,
                self.notifications_repository
                    .update_many_read(&notification_ids),
            )
            .await
            .map_err(|err| {
                tracing::warn!(%err, "failed to mark notifications as read");
                Error::Write(err)
            })?;
        }
        if !announcement_ids.is_empty() {
            with_timeout(
                timeout,
                self.overlays_repository
                    .insert_reads(user_id, &announcement_ids),
            )
            .await
            .map_err(|err| {
                tracing::warn!(%err, "failed to mark announcements as read");
                Error::Write(err)
            })?;
        }

        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            return Err(Error::IdentityChanged);
        }

        let changed = state
            .view
            .mark_many_read(&notification_ids, &announcement_ids);
        if changed > 0 {
            state.publish();
        }

        tracing::info!(
            changed,
            unread_count = state.view.unread_count,
            "marked all as read"
        );

        Ok(())
    }

    async fn hide(&self, ids: Vec<ObjectId>, kind: ItemKind) -> Result<(), Error> {
        tracing::info!(?ids, kind = kind.as_ref(), "hiding items");

        let mut unique_ids = HashSet::with_capacity(ids.len());
        let ids = ids
            .into_iter()
            .filter(|id| unique_ids.insert(*id))
            .collect::<Vec<_>>();

        if ids.is_empty() {
            return Ok(());
        }

        let (generation, user_id) = self.session().await?;

        with_timeout(
            self.config.request_timeout,
            self.overlays_repository.insert_hidden(user_id, &ids, kind),
        )
        .await
        .map_err(|err| {
            tracing::warn!(%err, "failed to hide items");
            Error::Write(err)
        })?;

        let mut state = self.state.lock().await;
        if !state.is_current(generation) {
            return Err(Error::IdentityChanged);
        }

        state.hidden.extend(
            ids.iter()
                .map(|item_id| HiddenItem { item_id: *item_id, kind }),
        );
        let removed = state.view.remove(&unique_ids, kind);
        state.publish();

        tracing::info!(
            removed,
            unread_count = state.view.unread_count,
            "hid items"
        );

        Ok(())
    }

    fn view(&self) -> AggregatedView {
        self.view_rx.borrow().clone()
    }

    fn watch_view(&self) -> watch::Receiver<AggregatedView> {
        self.view_rx.clone()
    }
}

async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, repository::Error>>,
) -> Result<T, repository::Error> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(repository::Error::Timeout),
    }
}
