use super::PushSubscription;
use async_trait::async_trait;
use bson::oid::ObjectId;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushFeed: Send + Sync {
    ///
    /// Subscribes to notifications created for the student
    /// and to every created announcement.
    ///
    /// Returned subscription must be closed with [PushSubscription::close]
    /// to stop delivery.
    ///
    async fn subscribe(&self, student_id: ObjectId) -> anyhow::Result<PushSubscription>;
}
