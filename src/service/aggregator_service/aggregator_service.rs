use crate::{
    dto::{AggregatedView, Identity, ItemKind},
    error::Error,
};
use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::watch;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AggregatorService: Send + Sync {
    ///
    /// Builds view of notifications and announcements for the identity
    /// and starts listening for created items.
    /// Switching to another identity drops the previous view and subscription
    /// as soon as the load starts, so a failed load for a new identity leaves
    /// the view empty and never shows the previous identity's items.
    ///
    /// ### Errors
    /// - [Error::NotFound] when identity has no student profile
    /// - [Error::Network] when any fetch failed, previous view of the same
    ///   identity is kept
    /// - [Error::IdentityChanged] when another identity was loaded or cleared
    ///   before this load finished
    ///
    async fn load(&self, identity: Identity) -> Result<(), Error>;

    ///
    /// Loads view again for the current identity
    ///
    /// ### Errors
    /// - [Error::NoIdentity]
    /// - same as [AggregatorService::load]
    ///
    async fn refresh(&self) -> Result<(), Error>;

    ///
    /// Drops view and subscription after identity was lost
    ///
    async fn clear(&self);

    ///
    /// Marks item as read for the current user
    ///
    /// ### Errors
    /// - [Error::NoIdentity]
    /// - [Error::NotFound] when item is not in the view
    /// - [Error::Write] when change was not saved, view is unchanged
    ///
    async fn mark_read(&self, id: ObjectId, kind: ItemKind) -> Result<(), Error>;

    ///
    /// Marks every unread item of the view as read
    ///
    /// ### Errors
    /// - [Error::NoIdentity]
    /// - [Error::Write] when change was not saved, view is unchanged
    ///
    async fn mark_all_read(&self) -> Result<(), Error>;

    ///
    /// Hides items for the current user. Hidden items never come back.
    ///
    /// ### Errors
    /// - [Error::NoIdentity]
    /// - [Error::Write] when change was not saved, view is unchanged
    ///
    async fn hide(&self, ids: Vec<ObjectId>, kind: ItemKind) -> Result<(), Error>;

    fn view(&self) -> AggregatedView;

    ///
    /// Receiver notified every time a new view is published
    ///
    fn watch_view(&self) -> watch::Receiver<AggregatedView>;
}
