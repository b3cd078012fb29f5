use crate::repository;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("network error: {0}")]
    Network(#[source] repository::Error),

    #[error("write error: {0}")]
    Write(#[source] repository::Error),

    ///
    /// Push channel could not be established.
    /// Aggregator keeps working and is updated only by refresh.
    ///
    #[error("subscription error: {0}")]
    Subscription(anyhow::Error),

    #[error("no identity")]
    NoIdentity,

    ///
    /// Identity changed while operation was in flight.
    /// Result of the operation was discarded.
    ///
    #[error("identity changed")]
    IdentityChanged,
}
