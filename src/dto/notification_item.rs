use bson::oid::ObjectId;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationItem {
    pub id: ObjectId,
    pub student_id: ObjectId,
    pub title: String,
    pub body: String,
    pub created_at: OffsetDateTime,
    pub read: bool,

    /// Deep-link target opened when the notification is tapped
    pub action_ref: Option<String>,
}
