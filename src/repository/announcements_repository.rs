use super::Error;
use crate::dto::AnnouncementItem;
use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnouncementsRepository: Send + Sync {
    ///
    /// Finds all broadcast announcements except the excluded ones.
    /// Announcements are sorted descending by creation date
    /// and returned with `read` set to false.
    ///
    async fn find_many(&self, excluded_ids: &[ObjectId]) -> Result<Vec<AnnouncementItem>, Error>;
}
