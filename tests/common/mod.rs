use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{options::ClientOptions, Client, Database};
use portal_notifier::{
    repository::{
        AnnouncementsRepositoryImpl, NotificationsRepositoryImpl, OverlaysRepositoryImpl,
        StudentsRepositoryImpl, ANNOUNCEMENTS, NOTIFICATIONS, STUDENTS,
    },
    service::{
        aggregator_service::{AggregatorServiceConfig, AggregatorServiceImpl},
        push_service::{MongoPushFeed, PushFeedConfig},
    },
};
use std::{sync::Arc, sync::Once, time::Duration};
use uuid::Uuid;

static INIT_ENV_ONCE: Once = Once::new();

pub fn init_env() {
    INIT_ENV_ONCE.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

pub async fn create_test_database() -> Database {
    init_env();
    let connection_string = std::env::var("PORTAL_NOTIFIER_DB_CONNECTION_STRING").unwrap();
    let db_name = format!("test_{}", Uuid::new_v4());

    let db_client_options = ClientOptions::parse(connection_string).await.unwrap();
    let db_client = Client::with_options(db_client_options).unwrap();

    db_client.database(&db_name)
}

pub async fn destroy_test_database(database: Database) {
    let _ = database.drop().await;
    database.client().clone().shutdown().await;
}

pub async fn create_service(database: &Database) -> AggregatorServiceImpl {
    let students_repository = StudentsRepositoryImpl::new(database.clone()).await.unwrap();
    let notifications_repository = NotificationsRepositoryImpl::new(database.clone())
        .await
        .unwrap();
    let announcements_repository = AnnouncementsRepositoryImpl::new(database.clone())
        .await
        .unwrap();
    let overlays_repository = OverlaysRepositoryImpl::new(database.clone()).await.unwrap();
    let push_feed = MongoPushFeed::new(PushFeedConfig { buffer_size: 16 }, database.clone());

    AggregatorServiceImpl::new(
        AggregatorServiceConfig {
            request_timeout: Duration::from_secs(5),
            load_retry_max_count: 3,
            load_retry_interval: Duration::from_millis(100),
            resort_interval: Duration::from_secs(60),
        },
        Arc::new(students_repository),
        Arc::new(notifications_repository),
        Arc::new(announcements_repository),
        Arc::new(overlays_repository),
        Arc::new(push_feed),
    )
}

pub async fn insert_student(database: &Database, index_number: &str) -> ObjectId {
    database
        .collection::<Document>(STUDENTS)
        .insert_one(doc! {
            "index_number": index_number,
        })
        .await
        .unwrap()
        .inserted_id
        .as_object_id()
        .unwrap()
}

pub async fn insert_notification(database: &Database, student_id: ObjectId, read: bool) -> ObjectId {
    database
        .collection::<Document>(NOTIFICATIONS)
        .insert_one(doc! {
            "student_id": student_id,
            "title": "Fees",
            "body": "Second semester fees are due",
            "created_at": DateTime::now(),
            "read": read,
            "action_ref": "/fees",
        })
        .await
        .unwrap()
        .inserted_id
        .as_object_id()
        .unwrap()
}

pub async fn insert_announcement(database: &Database) -> ObjectId {
    database
        .collection::<Document>(ANNOUNCEMENTS)
        .insert_one(doc! {
            "title": "Matriculation",
            "body": "Matriculation takes place on Friday",
            "category": "events",
            "created_at": DateTime::now(),
        })
        .await
        .unwrap()
        .inserted_id
        .as_object_id()
        .unwrap()
}
