use super::{
    create_collection_if_missing,
    entity::{AnnouncementReadFindEntity, HiddenItemFindEntity},
    is_duplicate_key, Error, OverlaysRepository, ANNOUNCEMENT_READS, HIDDEN_ITEMS,
};
use crate::dto::{HiddenItem, ItemKind};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime, Document};
use futures_util::TryStreamExt;
use mongodb::{options::IndexOptions, Collection, Database, IndexModel};
use std::collections::HashSet;
use time::OffsetDateTime;
use uuid::Uuid;

const INDEX_NAME_UNIQUE_READ: &str = "unique_user_id_announcement_id";
const INDEX_NAME_UNIQUE_HIDDEN: &str = "unique_user_id_item_id_is_announcement";

pub struct OverlaysRepositoryImpl {
    database: Database,
}

impl OverlaysRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        create_collection_if_missing(&database, ANNOUNCEMENT_READS).await?;
        create_collection_if_missing(&database, HIDDEN_ITEMS).await?;

        let reads = database.collection::<Document>(ANNOUNCEMENT_READS);
        Self::create_unique_index(
            &reads,
            INDEX_NAME_UNIQUE_READ,
            doc! {
                "user_id": 1,
                "announcement_id": 1,
            },
        )
        .await?;

        let hidden = database.collection::<Document>(HIDDEN_ITEMS);
        Self::create_unique_index(
            &hidden,
            INDEX_NAME_UNIQUE_HIDDEN,
            doc! {
                "user_id": 1,
                "item_id": 1,
                "is_announcement": 1,
            },
        )
        .await?;

        Ok(Self { database })
    }

    async fn create_unique_index(
        collection: &Collection<Document>,
        name: &'static str,
        keys: Document,
    ) -> Result<(), mongodb::error::Error> {
        let index_names = collection.list_index_names().await?;
        if index_names.contains(&name.to_string()) {
            return Ok(());
        }

        let index = IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name(name.to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        collection.create_index(index).await?;
        tracing::debug!("created index {}.{name}", collection.name());

        Ok(())
    }

    ///
    /// Inserts all documents in one unordered batch.
    /// Documents already present fail with duplicate key error
    /// and are skipped, the rest is still inserted.
    ///
    async fn insert_ignoring_duplicates(
        &self,
        collection: &'static str,
        documents: Vec<Document>,
    ) -> Result<(), Error> {
        if documents.is_empty() {
            return Ok(());
        }

        let result = self
            .database
            .collection::<Document>(collection)
            .insert_many(documents)
            .ordered(false)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => Ok(()),
            Err(err) => Err(Error::Mongo(err)),
        }
    }
}

#[async_trait]
impl OverlaysRepository for OverlaysRepositoryImpl {
    async fn find_read_announcement_ids(&self, user_id: Uuid) -> Result<HashSet<ObjectId>, Error> {
        let ids = self
            .database
            .collection::<AnnouncementReadFindEntity>(ANNOUNCEMENT_READS)
            .find(doc! {
                "user_id": bson::Uuid::from(user_id),
            })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(|entity| entity.announcement_id)
            .collect();

        Ok(ids)
    }

    async fn insert_reads(
        &self,
        user_id: Uuid,
        announcement_ids: &[ObjectId],
    ) -> Result<(), Error> {
        let user_id = bson::Uuid::from(user_id);
        let created_at = DateTime::from(OffsetDateTime::now_utc());

        let documents = announcement_ids
            .iter()
            .map(|announcement_id| {
                doc! {
                    "user_id": user_id,
                    "announcement_id": *announcement_id,
                    "created_at": created_at,
                }
            })
            .collect();

        self.insert_ignoring_duplicates(ANNOUNCEMENT_READS, documents)
            .await
    }

    async fn find_hidden(&self, user_id: Uuid) -> Result<Vec<HiddenItem>, Error> {
        let hidden = self
            .database
            .collection::<HiddenItemFindEntity>(HIDDEN_ITEMS)
            .find(doc! {
                "user_id": bson::Uuid::from(user_id),
            })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(HiddenItem::from)
            .collect();

        Ok(hidden)
    }

    async fn insert_hidden(
        &self,
        user_id: Uuid,
        ids: &[ObjectId],
        kind: ItemKind,
    ) -> Result<(), Error> {
        let user_id = bson::Uuid::from(user_id);
        let created_at = DateTime::from(OffsetDateTime::now_utc());

        let documents = ids
            .iter()
            .map(|id| {
                doc! {
                    "user_id": user_id,
                    "item_id": *id,
                    "is_announcement": kind.is_announcement(),
                    "created_at": created_at,
                }
            })
            .collect();

        self.insert_ignoring_duplicates(HIDDEN_ITEMS, documents)
            .await
    }
}
