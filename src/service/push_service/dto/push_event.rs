use crate::dto::{AnnouncementItem, NotificationItem};

#[derive(Debug, Clone)]
pub enum PushEvent {
    NotificationCreated(NotificationItem),
    AnnouncementCreated(AnnouncementItem),
}
