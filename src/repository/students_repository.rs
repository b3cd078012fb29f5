use super::Error;
use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentsRepository: Send + Sync {
    ///
    /// Finds id of the student profile with given index number
    ///
    async fn find_id_by_index_number(&self, index_number: &str)
        -> Result<Option<ObjectId>, Error>;
}
