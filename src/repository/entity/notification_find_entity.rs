use crate::dto::NotificationItem;
use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NotificationFindEntity {
    pub _id: ObjectId,
    pub student_id: ObjectId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime,

    #[serde(default)]
    pub read: bool,

    #[serde(default)]
    pub action_ref: Option<String>,
}

impl From<NotificationFindEntity> for NotificationItem {
    fn from(value: NotificationFindEntity) -> Self {
        Self {
            id: value._id,
            student_id: value.student_id,
            title: value.title,
            body: value.body,
            created_at: value.created_at.into(),
            read: value.read,
            action_ref: value.action_ref,
        }
    }
}
