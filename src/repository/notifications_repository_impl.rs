use super::{
    create_collection_if_missing, entity::NotificationFindEntity, Error, NotificationsRepository,
    NOTIFICATIONS,
};
use crate::dto::NotificationItem;
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures_util::TryStreamExt;
use mongodb::{options::IndexOptions, Database, IndexModel};

const INDEX_NAME_STUDENT_CREATED_AT: &str = "index_student_id_created_at";

pub struct NotificationsRepositoryImpl {
    database: Database,
}

impl NotificationsRepositoryImpl {
    pub async fn new(database: Database) -> Result<Self, mongodb::error::Error> {
        create_collection_if_missing(&database, NOTIFICATIONS).await?;

        let collection = database.collection::<Document>(NOTIFICATIONS);
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_STUDENT_CREATED_AT.to_string()) {
            let index = IndexModel::builder()
                .keys(doc! {
                    "student_id": 1,
                    "created_at": -1,
                })
                .options(
                    IndexOptions::builder()
                        .name(INDEX_NAME_STUDENT_CREATED_AT.to_string())
                        .build(),
                )
                .build();
            collection.create_index(index).await?;
            tracing::debug!("created index {NOTIFICATIONS}.{INDEX_NAME_STUDENT_CREATED_AT}");
        }

        Ok(Self { database })
    }
}

#[async_trait]
impl NotificationsRepository for NotificationsRepositoryImpl {
    async fn find_many(
        &self,
        student_id: ObjectId,
        excluded_ids: &[ObjectId],
    ) -> Result<Vec<NotificationItem>, Error> {
        let notifications = self
            .database
            .collection::<NotificationFindEntity>(NOTIFICATIONS)
            .find(doc! {
                "student_id": student_id,
                "_id": { "$nin": excluded_ids },
            })
            .sort(doc! {
                "created_at": -1,
            })
            .await?
            .try_collect::<Vec<_>>()
            .await?
            .into_iter()
            .map(NotificationItem::from)
            .collect();

        Ok(notifications)
    }

    async fn update_read(&self, id: ObjectId) -> Result<(), Error> {
        let update_result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .update_one(
                doc! {
                    "_id": id,
                },
                doc! {
                    "$set": {
                        "read": true,
                    }
                },
            )
            .await?;

        // matched_count instead of modified_count because replacing
        // true with true doesn't count as modification
        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }

    async fn update_many_read(&self, ids: &[ObjectId]) -> Result<(), Error> {
        self.database
            .collection::<Document>(NOTIFICATIONS)
            .update_many(
                doc! {
                    "_id": { "$in": ids },
                },
                doc! {
                    "$set": {
                        "read": true,
                    }
                },
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::test::{create_test_database, destroy_test_database};
    use bson::{Bson, DateTime};
    use std::time::Duration;
    use time::OffsetDateTime;

    async fn insert_notification(
        db: &Database,
        student_id: ObjectId,
        created_at: OffsetDateTime,
        read: bool,
    ) -> ObjectId {
        let insert_result = db
            .collection::<Document>(NOTIFICATIONS)
            .insert_one(doc! {
                "student_id": student_id,
                "title": "Course registration",
                "body": "Your registration for semester 1 was approved",
                "created_at": DateTime::from(created_at),
                "read": read,
            })
            .await
            .unwrap();

        let Bson::ObjectId(id) = insert_result.inserted_id else {
            panic!("invalid id type");
        };

        id
    }

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn find_many_owner_excluded_sorted() {
        let db = create_test_database().await;
        let repository = NotificationsRepositoryImpl::new(db.clone()).await.unwrap();

        let student_id = ObjectId::new();
        let now = OffsetDateTime::now_utc();
        let older = insert_notification(&db, student_id, now - Duration::from_secs(60), false).await;
        let newer = insert_notification(&db, student_id, now, true).await;
        let excluded = insert_notification(&db, student_id, now, false).await;
        insert_notification(&db, ObjectId::new(), now, false).await;

        let notifications = repository
            .find_many(student_id, &[excluded])
            .await
            .unwrap();

        let ids = notifications.iter().map(|n| n.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![newer, older]);
        assert!(notifications[0].read);
        assert!(!notifications[1].read);

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn update_read_twice_ok() {
        let db = create_test_database().await;
        let repository = NotificationsRepositoryImpl::new(db.clone()).await.unwrap();

        let id = insert_notification(&db, ObjectId::new(), OffsetDateTime::now_utc(), false).await;

        repository.update_read(id).await.unwrap();
        repository.update_read(id).await.unwrap();

        let entity = db
            .collection::<NotificationFindEntity>(NOTIFICATIONS)
            .find_one(doc! { "_id": id })
            .await
            .unwrap()
            .unwrap();
        assert!(entity.read);

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn update_read_not_exist() {
        let db = create_test_database().await;
        let repository = NotificationsRepositoryImpl::new(db.clone()).await.unwrap();

        let err = repository.update_read(ObjectId::new()).await.unwrap_err();

        assert!(matches!(err, Error::NoDocumentUpdated));

        destroy_test_database(db).await;
    }

    #[tokio::test]
    #[ignore = "requires running MongoDB"]
    async fn update_many_read_only_listed() {
        let db = create_test_database().await;
        let repository = NotificationsRepositoryImpl::new(db.clone()).await.unwrap();

        let student_id = ObjectId::new();
        let now = OffsetDateTime::now_utc();
        let id_1 = insert_notification(&db, student_id, now, false).await;
        let id_2 = insert_notification(&db, student_id, now, false).await;
        let untouched = insert_notification(&db, student_id, now, false).await;

        repository.update_many_read(&[id_1, id_2]).await.unwrap();

        let notifications = repository.find_many(student_id, &[]).await.unwrap();
        for notification in notifications {
            assert_eq!(notification.read, notification.id != untouched);
        }

        destroy_test_database(db).await;
    }
}
