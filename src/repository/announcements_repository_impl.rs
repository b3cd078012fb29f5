use super::{
    create_collection_if_missing, entity::AnnouncementFindEntity, AnnouncementsRepository, Error,
    ANNOUNCEMENTS,
};
use crate::dto::AnnouncementItem;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures_util::TryStreamExt;
use mongodb::{options::IndexOptions, Database, IndexModel};

const INDEX_NAME_CREATED_AT: &str = "index_created_at";

pub struct AnnouncementsRepositoryImpl {
    database: Database,
}

impl AnnouncementsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        create_collection_if_missing(&database, ANNOUNCEMENTS).await?;

        let collection = database.collection::<Document>(ANNOUNCEMENTS);
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_CREATED_AT.to_string()) {
            let index = IndexModel::builder()
                .keys(doc! {
                    "created_at": -1,
                })
                .options(
                    IndexOptions::builder()
                        .name(INDEX_NAME_CREATED_AT.to_string())
                        .build(),
                )
                .build();
            collection.create_index(index).await?;
            tracing::debug!("created index {ANNOUNCEMENTS}.{INDEX_NAME_CREATED_AT}");
        }

        Ok(Self { database })
    }
}

#[async_trait]
impl AnnouncementsRepository for AnnouncementsRepositoryImpl {
    async fn find_many(&self, excluded_ids: &[ObjectId]) -> Result<Vec<AnnouncementItem>, Error> {
        let announcements = self
            .database
            .collection::<AnnouncementFindEntity>(ANNOUNCEMENTS)
            .find(doc! {
                "_id": { "$nin": excluded_ids },
            })
            .sort(doc! {
                "created_at": -1,
            })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(AnnouncementItem::from)
            .collect();

        Ok(announcements)
    }
}
