use super::ItemKind;
use bson::oid::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HiddenItem {
    pub item_id: ObjectId,
    pub kind: ItemKind,
}
