use crate::dto::{HiddenItem, ItemKind};
use bson::oid::ObjectId;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct HiddenItemFindEntity {
    pub item_id: ObjectId,
    pub is_announcement: bool,
}

impl From<HiddenItemFindEntity> for HiddenItem {
    fn from(value: HiddenItemFindEntity) -> Self {
        Self {
            item_id: value.item_id,
            kind: ItemKind::from_is_announcement(value.is_announcement),
        }
    }
}
