use super::ApplicationStateToClose;

pub async fn close(state: ApplicationStateToClose) {
    tracing::info!("closing session driver");
    state.session_driver_close_notify.notify_one();
    if let Err(err) = state.session_driver_handle.await {
        tracing::error!(%err, "session driver failed");
    }

    tracing::info!("closing aggregator service");
    state.aggregator_service.close().await;

    tracing::info!("closing connection with database");
    state.db_client.shutdown().await;
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("starting shutdown");
}
