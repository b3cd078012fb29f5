use portal_notifier::{
    application::{self, ApplicationEnv},
    dto::Identity,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    {
        // Ignore error because .env file is not required
        // as long as env variables are set
        let _ = dotenvy::dotenv();
    }

    let env = ApplicationEnv::parse()?;

    application::setup_tracing(&env)?;

    let (state, state_to_close) = application::create_state(&env).await?;

    if let Some(session) = &env.session {
        let identity =
            Identity::from_identifier(session.user_id, &session.identifier, &env.email_domain);
        tracing::info!(user_id = %identity.user_id, email = %identity.email, "signing in");
        state.identity_tx.send_replace(Some(identity));
    }

    let mut view_rx = state.aggregator_service.watch_view();
    let log_views = async move {
        while view_rx.changed().await.is_ok() {
            let view = view_rx.borrow_and_update().clone();
            tracing::info!(
                notifications = view.notifications.len(),
                announcements = view.announcements.len(),
                unread_count = view.unread_count,
                loading = view.loading,
                push_status = view.push_status.as_ref(),
                "view published"
            );
        }
    };

    tokio::select! {
        _ = application::shutdown_signal() => {},
        _ = log_views => {},
    }

    application::close(state_to_close).await;

    Ok(())
}
