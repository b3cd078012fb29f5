mod announcements_repository;
mod announcements_repository_impl;
mod entity;
mod error;
mod notifications_repository;
mod notifications_repository_impl;
mod overlays_repository;
mod overlays_repository_impl;
mod students_repository;
mod students_repository_impl;

pub use announcements_repository::*;
pub use announcements_repository_impl::*;
pub use entity::{AnnouncementFindEntity, NotificationFindEntity};
pub use error::*;
pub use notifications_repository::*;
pub use notifications_repository_impl::*;
pub use overlays_repository::*;
pub use overlays_repository_impl::*;
pub use students_repository::*;
pub use students_repository_impl::*;

use mongodb::{
    error::{ErrorKind, InsertManyError, WriteFailure},
    Database,
};

pub const STUDENTS: &str = "students";
pub const NOTIFICATIONS: &str = "notifications";
pub const ANNOUNCEMENTS: &str = "announcements";
pub const ANNOUNCEMENT_READS: &str = "announcement_reads";
pub const HIDDEN_ITEMS: &str = "hidden_items";

async fn create_collection_if_missing(
    database: &Database,
    name: &'static str,
) -> Result<(), mongodb::error::Error> {
    let names = database.list_collection_names().await?;
    if !names.iter().any(|existing| existing == name) {
        tracing::debug!(collection = name, "creating collection");
        database.create_collection(name).await?;
    }

    Ok(())
}

///
/// Duplicate key error of a single write or an unordered bulk insert
/// in which every failed document was a duplicate
///
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    const DUPLICATE_KEY_CODE: i32 = 11000;

    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref write_error)) => {
            write_error.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::InsertMany(InsertManyError {
            write_errors: Some(ref write_errors),
            write_concern_error: None,
            ..
        }) => write_errors
            .iter()
            .all(|write_error| write_error.code == DUPLICATE_KEY_CODE),
        _ => false,
    }
}
