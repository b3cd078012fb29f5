use crate::dto::AnnouncementItem;
use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AnnouncementFindEntity {
    pub _id: ObjectId,
    pub title: String,
    pub body: String,

    #[serde(default)]
    pub category: Option<String>,
    pub created_at: DateTime,
}

impl From<AnnouncementFindEntity> for AnnouncementItem {
    fn from(value: AnnouncementFindEntity) -> Self {
        Self {
            id: value._id,
            title: value.title,
            body: value.body,
            category: value.category,
            created_at: value.created_at.into(),
            read: false,
        }
    }
}
