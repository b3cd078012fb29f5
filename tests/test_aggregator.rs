mod common;
pub use common::*;

use portal_notifier::{
    dto::{Identity, ItemKind, PushStatus},
    error::Error,
    service::aggregator_service::AggregatorService,
};
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

const EMAIL_DOMAIN: &str = "live.gctu.edu.gh";

#[tokio::test]
#[ignore = "requires running MongoDB"]
async fn load_mark_all_read_and_refresh() {
    let database = create_test_database().await;
    let index_number = "0321080123";
    let student_id = insert_student(&database, index_number).await;
    let other_student_id = insert_student(&database, "0321080999").await;
    for _ in 0..3 {
        insert_notification(&database, student_id, false).await;
    }
    insert_notification(&database, other_student_id, false).await;
    insert_announcement(&database).await;
    insert_announcement(&database).await;

    let service = create_service(&database).await;
    let identity = Identity::from_identifier(Uuid::new_v4(), index_number, EMAIL_DOMAIN);

    service.load(identity).await.unwrap();
    let view = service.view();
    assert_eq!(view.notifications.len(), 3);
    assert_eq!(view.announcements.len(), 2);
    assert_eq!(view.unread_count, 5);

    service.mark_all_read().await.unwrap();
    assert_eq!(service.view().unread_count, 0);

    // read state must come from the database after refresh
    service.refresh().await.unwrap();
    let view = service.view();
    assert_eq!(view.unread_count, 0);
    assert!(view.announcements.iter().all(|announcement| announcement.read));

    service.close().await;
    destroy_test_database(database).await;
}

#[tokio::test]
#[ignore = "requires running MongoDB"]
async fn hide_survives_new_session() {
    let database = create_test_database().await;
    let index_number = "0321080124";
    let student_id = insert_student(&database, index_number).await;
    let hidden_id = insert_notification(&database, student_id, false).await;
    let visible_id = insert_notification(&database, student_id, true).await;

    let identity = Identity::from_identifier(Uuid::new_v4(), index_number, EMAIL_DOMAIN);

    let service = create_service(&database).await;
    service.load(identity.clone()).await.unwrap();
    service
        .hide(vec![hidden_id], ItemKind::Notification)
        .await
        .unwrap();
    service.close().await;

    let service = create_service(&database).await;
    service.load(identity).await.unwrap();
    let view = service.view();
    assert_eq!(view.notifications.len(), 1);
    assert_eq!(view.notifications[0].id, visible_id);
    assert_eq!(view.unread_count, 0);

    service.close().await;
    destroy_test_database(database).await;
}

#[tokio::test]
#[ignore = "requires running MongoDB"]
async fn load_unknown_student_not_found() {
    let database = create_test_database().await;
    let service = create_service(&database).await;
    let identity = Identity::from_identifier(Uuid::new_v4(), "0000000000", EMAIL_DOMAIN);

    let load_result = service.load(identity).await;

    assert!(matches!(load_result, Err(Error::NotFound(_))));

    service.close().await;
    destroy_test_database(database).await;
}

#[tokio::test]
#[ignore = "requires MongoDB replica set"]
async fn inserted_items_are_pushed() {
    let database = create_test_database().await;
    let index_number = "0321080125";
    let student_id = insert_student(&database, index_number).await;
    insert_announcement(&database).await;

    let service = create_service(&database).await;
    let identity = Identity::from_identifier(Uuid::new_v4(), index_number, EMAIL_DOMAIN);
    service.load(identity).await.unwrap();
    assert_eq!(service.view().push_status, PushStatus::Live);

    let notification_id = insert_notification(&database, student_id, false).await;
    let announcement_id = insert_announcement(&database).await;

    let mut view_rx = service.watch_view();
    let view = timeout(
        Duration::from_secs(5),
        view_rx.wait_for(|view| view.unread_count == 3),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert_eq!(view.notifications[0].id, notification_id);
    assert_eq!(view.announcements[0].id, announcement_id);

    service.close().await;
    destroy_test_database(database).await;
}
