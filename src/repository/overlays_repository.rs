use super::Error;
use crate::dto::{HiddenItem, ItemKind};
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::HashSet;
use uuid::Uuid;

///
/// Per-user read and hidden records layered on top of notifications
/// and announcements without modifying the shared rows.
///
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OverlaysRepository: Send + Sync {
    ///
    /// Finds ids of announcements the user has read
    ///
    async fn find_read_announcement_ids(&self, user_id: Uuid) -> Result<HashSet<ObjectId>, Error>;

    ///
    /// Inserts read entry for each announcement.
    /// Entries that already exist are left unchanged.
    ///
    async fn insert_reads(&self, user_id: Uuid, announcement_ids: &[ObjectId])
        -> Result<(), Error>;

    ///
    /// Finds every item hidden by the user
    ///
    async fn find_hidden(&self, user_id: Uuid) -> Result<Vec<HiddenItem>, Error>;

    ///
    /// Inserts hidden entry for each item.
    /// Entries that already exist are left unchanged.
    ///
    async fn insert_hidden(&self, user_id: Uuid, ids: &[ObjectId], kind: ItemKind)
        -> Result<(), Error>;
}
