use super::{AnnouncementItem, HiddenItem, ItemKind, NotificationItem, PushStatus};
use bson::oid::ObjectId;
use serde::Serialize;
use std::collections::HashSet;
use time::OffsetDateTime;

///
/// Merged projection of personal notifications and announcements
/// for the current identity.
///
/// `unread_count` is kept equal to the number of unread items in both lists
/// by every method that changes them.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregatedView {
    pub notifications: Vec<NotificationItem>,
    pub announcements: Vec<AnnouncementItem>,
    pub unread_count: usize,

    /// Load for the current identity is in flight
    pub loading: bool,
    pub push_status: PushStatus,
}

impl AggregatedView {
    ///
    /// Builds view from freshly fetched rows.
    ///
    /// Hidden items are dropped even if the backend returned them,
    /// announcements get their `read` flag from `read_announcement_ids`
    /// and both lists are ordered newest first.
    ///
    pub fn build(
        notifications: Vec<NotificationItem>,
        announcements: Vec<AnnouncementItem>,
        read_announcement_ids: &HashSet<ObjectId>,
        hidden: &HashSet<HiddenItem>,
    ) -> Self {
        let mut notifications = notifications
            .into_iter()
            .filter(|notification| !is_hidden(hidden, notification.id, ItemKind::Notification))
            .collect::<Vec<_>>();

        let mut announcements = announcements
            .into_iter()
            .filter(|announcement| !is_hidden(hidden, announcement.id, ItemKind::Announcement))
            .map(|mut announcement| {
                announcement.read = read_announcement_ids.contains(&announcement.id);
                announcement
            })
            .collect::<Vec<_>>();

        sort_newest_first(&mut notifications, |notification| notification.created_at);
        sort_newest_first(&mut announcements, |announcement| announcement.created_at);

        let mut view = Self {
            notifications,
            announcements,
            ..Default::default()
        };
        view.unread_count = view.recount();

        view
    }

    ///
    /// Counts unread items directly from the lists
    ///
    pub fn recount(&self) -> usize {
        let unread_notifications = self
            .notifications
            .iter()
            .filter(|notification| !notification.read)
            .count();
        let unread_announcements = self
            .announcements
            .iter()
            .filter(|announcement| !announcement.read)
            .count();

        unread_notifications + unread_announcements
    }

    pub fn contains(&self, id: ObjectId, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Notification => self
                .notifications
                .iter()
                .any(|notification| notification.id == id),
            ItemKind::Announcement => self
                .announcements
                .iter()
                .any(|announcement| announcement.id == id),
        }
    }

    ///
    /// Ids of currently unread notifications and announcements
    ///
    pub fn unread_ids(&self) -> (Vec<ObjectId>, Vec<ObjectId>) {
        self.ids_by_read(false)
    }

    ///
    /// Ids of notifications and announcements already marked as read
    ///
    pub fn read_ids(&self) -> (Vec<ObjectId>, Vec<ObjectId>) {
        self.ids_by_read(true)
    }

    fn ids_by_read(&self, read: bool) -> (Vec<ObjectId>, Vec<ObjectId>) {
        let notification_ids = self
            .notifications
            .iter()
            .filter(|notification| notification.read == read)
            .map(|notification| notification.id)
            .collect();
        let announcement_ids = self
            .announcements
            .iter()
            .filter(|announcement| announcement.read == read)
            .map(|announcement| announcement.id)
            .collect();

        (notification_ids, announcement_ids)
    }

    ///
    /// Marks item as read.
    ///
    /// ### Returns
    /// true when the item was present and unread at the moment of the call
    ///
    pub fn mark_read(&mut self, id: ObjectId, kind: ItemKind) -> bool {
        let was_unread = match kind {
            ItemKind::Notification => self
                .notifications
                .iter_mut()
                .find(|notification| notification.id == id)
                .map(|notification| !std::mem::replace(&mut notification.read, true)),
            ItemKind::Announcement => self
                .announcements
                .iter_mut()
                .find(|announcement| announcement.id == id)
                .map(|announcement| !std::mem::replace(&mut announcement.read, true)),
        };

        match was_unread {
            Some(true) => {
                self.unread_count = self.unread_count.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    ///
    /// Marks every listed item as read.
    /// Items that are missing or already read are skipped.
    ///
    /// ### Returns
    /// number of items that changed from unread to read
    ///
    pub fn mark_many_read(
        &mut self,
        notification_ids: &[ObjectId],
        announcement_ids: &[ObjectId],
    ) -> usize {
        let notifications = notification_ids
            .iter()
            .filter(|id| self.mark_read(**id, ItemKind::Notification))
            .count();
        let announcements = announcement_ids
            .iter()
            .filter(|id| self.mark_read(**id, ItemKind::Announcement))
            .count();

        notifications + announcements
    }

    ///
    /// Removes items from the list of given kind.
    /// Counter is decreased by the number of removed items that were unread
    /// at the moment of removal.
    ///
    /// ### Returns
    /// number of removed items
    ///
    pub fn remove(&mut self, ids: &HashSet<ObjectId>, kind: ItemKind) -> usize {
        let mut removed = 0;
        let mut removed_unread = 0;

        let mut should_keep = |id: &ObjectId, read: bool| {
            let remove = ids.contains(id);
            if remove {
                removed += 1;
                if !read {
                    removed_unread += 1;
                }
            }
            !remove
        };

        match kind {
            ItemKind::Notification => self
                .notifications
                .retain(|notification| should_keep(&notification.id, notification.read)),
            ItemKind::Announcement => self
                .announcements
                .retain(|announcement| should_keep(&announcement.id, announcement.read)),
        }

        self.unread_count = self.unread_count.saturating_sub(removed_unread);

        removed
    }

    ///
    /// Puts pushed notification at the front of the list.
    ///
    /// ### Returns
    /// false when notification with the same id is already present
    ///
    pub fn prepend_notification(&mut self, notification: NotificationItem) -> bool {
        if self.contains(notification.id, ItemKind::Notification) {
            return false;
        }

        if !notification.read {
            self.unread_count += 1;
        }
        self.notifications.insert(0, notification);

        true
    }

    ///
    /// Puts pushed announcement at the front of the list as unread.
    /// A brand-new announcement cannot have a read overlay entry yet.
    ///
    /// ### Returns
    /// false when announcement with the same id is already present
    ///
    pub fn prepend_announcement(&mut self, mut announcement: AnnouncementItem) -> bool {
        if self.contains(announcement.id, ItemKind::Announcement) {
            return false;
        }

        announcement.read = false;
        self.unread_count += 1;
        self.announcements.insert(0, announcement);

        true
    }

    ///
    /// Restores newest-first order that push prepends may have broken.
    /// Sort is stable so items with equal `created_at` keep arrival order.
    ///
    /// ### Returns
    /// true when any list changed
    ///
    pub fn resort(&mut self) -> bool {
        let notifications_sorted =
            is_newest_first(&self.notifications, |notification| notification.created_at);
        let announcements_sorted =
            is_newest_first(&self.announcements, |announcement| announcement.created_at);

        if !notifications_sorted {
            sort_newest_first(&mut self.notifications, |notification| notification.created_at);
        }
        if !announcements_sorted {
            sort_newest_first(&mut self.announcements, |announcement| announcement.created_at);
        }

        !(notifications_sorted && announcements_sorted)
    }
}

fn is_hidden(hidden: &HashSet<HiddenItem>, item_id: ObjectId, kind: ItemKind) -> bool {
    hidden.contains(&HiddenItem { item_id, kind })
}

fn sort_newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> OffsetDateTime) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

fn is_newest_first<T>(items: &[T], created_at: impl Fn(&T) -> OffsetDateTime) -> bool {
    items
        .windows(2)
        .all(|pair| created_at(&pair[0]) >= created_at(&pair[1]))
}
