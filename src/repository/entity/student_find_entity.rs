use bson::oid::ObjectId;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct StudentFindEntity {
    pub _id: ObjectId,
}
