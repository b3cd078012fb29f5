use bson::oid::ObjectId;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AnnouncementReadFindEntity {
    pub announcement_id: ObjectId,
}
