use super::ApplicationEnv;
use crate::{
    dto::Identity,
    repository::{
        AnnouncementsRepositoryImpl, NotificationsRepositoryImpl, OverlaysRepositoryImpl,
        StudentsRepositoryImpl,
    },
    service::{
        aggregator_service::{AggregatorService, AggregatorServiceConfig, AggregatorServiceImpl},
        push_service::{MongoPushFeed, PushFeedConfig},
        session_service::SessionDriver,
    },
};
use mongodb::{options::ClientOptions, Client};
use std::sync::Arc;
use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
};

#[derive(Clone)]
pub struct ApplicationState {
    pub aggregator_service: Arc<dyn AggregatorService>,

    /// Session provider side. `None` signs the current identity out.
    pub identity_tx: watch::Sender<Option<Identity>>,
}

pub struct ApplicationStateToClose {
    pub db_client: Client,
    pub aggregator_service: Arc<AggregatorServiceImpl>,
    pub session_driver_close_notify: Arc<Notify>,
    pub session_driver_handle: JoinHandle<()>,
}

pub async fn create_state(
    env: &ApplicationEnv,
) -> anyhow::Result<(ApplicationState, ApplicationStateToClose)> {
    tracing::info!("connecting to database");
    let db_client_options = ClientOptions::parse(&env.db_connection_string).await?;
    let db_client = Client::with_options(db_client_options)?;
    let db = db_client.database(&env.db_name);

    tracing::info!("creating repositories");
    let students_repository = StudentsRepositoryImpl::new(db.clone()).await?;
    let students_repository = Arc::new(students_repository);
    let notifications_repository = NotificationsRepositoryImpl::new(db.clone()).await?;
    let notifications_repository = Arc::new(notifications_repository);
    let announcements_repository = AnnouncementsRepositoryImpl::new(db.clone()).await?;
    let announcements_repository = Arc::new(announcements_repository);
    let overlays_repository = OverlaysRepositoryImpl::new(db.clone()).await?;
    let overlays_repository = Arc::new(overlays_repository);

    tracing::info!("creating services");
    let config = PushFeedConfig {
        buffer_size: env.push_buffer_size,
    };
    let push_feed = MongoPushFeed::new(config, db);
    let push_feed = Arc::new(push_feed);

    let config = AggregatorServiceConfig {
        request_timeout: env.request_timeout,
        load_retry_max_count: env.load_retry_max_count,
        load_retry_interval: env.load_retry_interval,
        resort_interval: env.resort_interval,
    };
    let aggregator_service = AggregatorServiceImpl::new(
        config,
        students_repository,
        notifications_repository,
        announcements_repository,
        overlays_repository,
        push_feed,
    );
    let aggregator_service = Arc::new(aggregator_service);

    let (identity_tx, identity_rx) = watch::channel(None);
    let session_driver = SessionDriver::new(identity_rx, aggregator_service.clone());
    let session_driver_close_notify = Arc::new(Notify::new());
    let session_driver_handle =
        tokio::spawn(session_driver.run(session_driver_close_notify.clone()));

    Ok((
        ApplicationState {
            aggregator_service: aggregator_service.clone(),
            identity_tx,
        },
        ApplicationStateToClose {
            db_client,
            aggregator_service,
            session_driver_close_notify,
            session_driver_handle,
        },
    ))
}
