use super::Error;
use crate::dto::NotificationItem;
use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    ///
    /// Finds personal notifications of the student except the excluded ones.
    /// Notifications are sorted descending by creation date.
    ///
    async fn find_many(
        &self,
        student_id: ObjectId,
        excluded_ids: &[ObjectId],
    ) -> Result<Vec<NotificationItem>, Error>;

    ///
    /// Sets notification read flag
    ///
    /// ### Errors
    /// - [Error::NoDocumentUpdated] when
    ///     - notification does not exist
    ///
    async fn update_read(&self, id: ObjectId) -> Result<(), Error>;

    ///
    /// Sets read flag of every listed notification.
    /// Missing notifications are skipped.
    ///
    async fn update_many_read(&self, ids: &[ObjectId]) -> Result<(), Error>;
}
