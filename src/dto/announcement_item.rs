use bson::oid::ObjectId;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnouncementItem {
    pub id: ObjectId,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub created_at: OffsetDateTime,

    ///
    /// Announcements are shared by all students so the stored row has no read flag.
    /// This value is derived from the user's read overlay.
    ///
    pub read: bool,
}
