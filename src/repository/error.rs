#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no document updated")]
    NoDocumentUpdated,

    #[error("operation timed out")]
    Timeout,

    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}
