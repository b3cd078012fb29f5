use crate::{
    dto::{
        AggregatedView, AnnouncementItem, HiddenItem, Identity, ItemKind, NotificationItem,
        PushStatus,
    },
    error::Error,
};
use bson::oid::ObjectId;
use std::collections::HashSet;
use tokio::sync::watch;
use uuid::Uuid;

///
/// State shared by the service, push ingestion and resort tasks.
///
/// `generation` changes every time identity changes. Work started
/// for an older generation must not touch the view.
///
pub struct AggregatorState {
    pub generation: u64,
    pub identity: Option<Identity>,
    pub student_id: Option<ObjectId>,
    pub hidden: HashSet<HiddenItem>,
    pub view: AggregatedView,

    pending_loads: usize,

    /// Items pushed while a load is in flight, replayed onto its snapshot
    pushed_notifications: Vec<NotificationItem>,
    pushed_announcements: Vec<AnnouncementItem>,

    view_tx: watch::Sender<AggregatedView>,
}

///
/// Rows fetched by a single load
///
pub struct Snapshot {
    pub hidden: HashSet<HiddenItem>,
    pub notifications: Vec<NotificationItem>,
    pub announcements: Vec<AnnouncementItem>,
    pub read_announcement_ids: HashSet<ObjectId>,
}

impl AggregatorState {
    pub fn new() -> (Self, watch::Receiver<AggregatedView>) {
        let (view_tx, view_rx) = watch::channel(AggregatedView::default());

        let state = Self {
            generation: 0,
            identity: None,
            student_id: None,
            hidden: HashSet::new(),
            view: AggregatedView::default(),
            pending_loads: 0,
            pushed_notifications: Vec::new(),
            pushed_announcements: Vec::new(),
            view_tx,
        };

        (state, view_rx)
    }

    ///
    /// Registers load for the identity.
    /// Different identity than the current one starts new generation
    /// with an empty view.
    ///
    /// ### Returns
    /// generation of the load and whether identity changed
    ///
    pub fn begin_load(&mut self, identity: &Identity) -> (u64, bool) {
        let identity_changed = self.identity.as_ref() != Some(identity);
        if identity_changed {
            self.start_generation(Some(identity.clone()));
        }

        self.pending_loads += 1;
        self.publish();

        (self.generation, identity_changed)
    }

    ///
    /// Unregisters load.
    ///
    /// ### Returns
    /// false when load belonged to an older generation
    ///
    pub fn finish_load(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }

        self.pending_loads = self.pending_loads.saturating_sub(1);
        if self.pending_loads == 0 {
            self.pushed_notifications.clear();
            self.pushed_announcements.clear();
        }

        true
    }

    ///
    /// Forgets identity and everything loaded for it
    ///
    pub fn reset(&mut self) {
        self.start_generation(None);
        self.publish();
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn is_hidden(&self, item_id: ObjectId, kind: ItemKind) -> bool {
        self.hidden.contains(&HiddenItem { item_id, kind })
    }

    pub fn user_id(&self) -> Result<Uuid, Error> {
        self.identity
            .as_ref()
            .map(|identity| identity.user_id)
            .ok_or(Error::NoIdentity)
    }

    pub fn record_pushed_notification(&mut self, notification: &NotificationItem) {
        if self.pending_loads > 0 {
            self.pushed_notifications.push(notification.clone());
        }
    }

    pub fn record_pushed_announcement(&mut self, announcement: &AnnouncementItem) {
        if self.pending_loads > 0 {
            self.pushed_announcements.push(announcement.clone());
        }
    }

    ///
    /// Replaces view with rows of a finished load.
    ///
    /// Rows may predate changes applied while they were fetched.
    /// Hidden items and read flags of the current view win over the snapshot
    /// and items pushed during the load are replayed onto it.
    /// Must only be called for the current generation.
    ///
    pub fn apply_snapshot(&mut self, snapshot: Snapshot, push_status: PushStatus) {
        self.hidden.extend(snapshot.hidden);

        let mut view = AggregatedView::build(
            snapshot.notifications,
            snapshot.announcements,
            &snapshot.read_announcement_ids,
            &self.hidden,
        );

        let mut replayed = false;
        for notification in &self.pushed_notifications {
            if !self.is_hidden(notification.id, ItemKind::Notification) {
                replayed |= view.prepend_notification(notification.clone());
            }
        }
        for announcement in &self.pushed_announcements {
            if !self.is_hidden(announcement.id, ItemKind::Announcement) {
                replayed |= view.prepend_announcement(announcement.clone());
            }
        }
        if replayed {
            view.resort();
        }

        let (read_notification_ids, read_announcement_ids) = self.view.read_ids();
        view.mark_many_read(&read_notification_ids, &read_announcement_ids);

        self.view = AggregatedView {
            push_status,
            ..view
        };
    }

    ///
    /// Sends copy of the view to consumers
    ///
    pub fn publish(&mut self) {
        self.view.loading = self.pending_loads > 0;
        self.view_tx.send_replace(self.view.clone());
    }

    fn start_generation(&mut self, identity: Option<Identity>) {
        self.generation += 1;
        self.identity = identity;
        self.student_id = None;
        self.hidden.clear();
        self.view = AggregatedView::default();
        self.pending_loads = 0;
        self.pushed_notifications.clear();
        self.pushed_announcements.clear();
    }
}
