use super::{
    create_collection_if_missing, entity::StudentFindEntity, Error, StudentsRepository, STUDENTS,
};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::{options::IndexOptions, Database, IndexModel};

const INDEX_NAME_UNIQUE_INDEX_NUMBER: &str = "unique_index_number";

pub struct StudentsRepositoryImpl {
    database: Database,
}

impl StudentsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        create_collection_if_missing(&database, STUDENTS).await?;

        let collection = database.collection::<Document>(STUDENTS);
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_UNIQUE_INDEX_NUMBER.to_string()) {
            let index = IndexModel::builder()
                .keys(doc! {
                    "index_number": 1,
                })
                .options(
                    IndexOptions::builder()
                        .name(INDEX_NAME_UNIQUE_INDEX_NUMBER.to_string())
                        .unique(true)
                        .build(),
                )
                .build();
            collection.create_index(index).await?;
            tracing::debug!("created index {STUDENTS}.{INDEX_NAME_UNIQUE_INDEX_NUMBER}");
        }

        Ok(Self { database })
    }
}

#[async_trait]
impl StudentsRepository for StudentsRepositoryImpl {
    async fn find_id_by_index_number(
        &self,
        index_number: &str,
    ) -> Result<Option<ObjectId>, Error> {
        let id = self
            .database
            .collection::<StudentFindEntity>(STUDENTS)
            .find_one(doc! {
                "index_number": index_number,
            })
            .projection(doc! { "_id": 1 })
            .await?
            .map(|entity| entity._id);

        Ok(id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::test::{create_test_database, destroy_test_database};

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn find_id_by_index_number_exist() {
        let db = create_test_database().await;
        let repository = StudentsRepositoryImpl::new(db.clone()).await.unwrap();

        let insert_result = db
            .collection::<Document>(STUDENTS)
            .insert_one(doc! {
                "index_number": "0321080123",
                "first_name": "Ama",
            })
            .await
            .unwrap();

        let id = repository
            .find_id_by_index_number("0321080123")
            .await
            .unwrap();

        assert_eq!(id.map(bson::Bson::ObjectId), Some(insert_result.inserted_id));

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn find_id_by_index_number_not_exist() {
        let db = create_test_database().await;
        let repository = StudentsRepositoryImpl::new(db.clone()).await.unwrap();

        let id = repository
            .find_id_by_index_number("does not exist")
            .await
            .unwrap();

        assert!(id.is_none());

        destroy_test_database(db).await;
    }
}
