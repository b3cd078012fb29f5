use crate::{dto::Identity, service::aggregator_service::AggregatorService};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

///
/// Follows identity published by the session provider.
/// Signed in identity is loaded, lost identity clears the view.
/// Republishing the current identity is ignored, use refresh to reload.
///
/// Changes are applied one at a time. Identities published while a load
/// is in flight are coalesced and only the latest one is applied.
///
pub struct SessionDriver {
    identity_rx: watch::Receiver<Option<Identity>>,
    aggregator_service: Arc<dyn AggregatorService>,
}

impl SessionDriver {
    pub fn new(
        identity_rx: watch::Receiver<Option<Identity>>,
        aggregator_service: Arc<dyn AggregatorService>,
    ) -> Self {
        Self {
            identity_rx,
            aggregator_service,
        }
    }

    #[tracing::instrument(name = "Session Driver", skip_all)]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        // None until the first published value is applied
        let mut applied: Option<Option<Identity>> = None;

        loop {
            let identity = self.identity_rx.borrow_and_update().clone();
            if applied.as_ref() != Some(&identity) {
                self.apply(identity.clone()).await;
                applied = Some(identity);
            }

            tokio::select! {
                biased;

                // Wait for signal to close
                _ = close_notify.notified() => break,

                changed = self.identity_rx.changed() => {
                    if changed.is_err() {
                        tracing::info!("session provider closed");
                        break;
                    }
                }
            }
        }
    }

    async fn apply(&self, identity: Option<Identity>) {
        match identity {
            Some(identity) => {
                tracing::info!(user_id = %identity.user_id, "identity available");
                if let Err(err) = self.aggregator_service.load(identity).await {
                    tracing::warn!(%err, "failed to load view for identity");
                }
            }
            None => {
                tracing::info!("identity lost");
                self.aggregator_service.clear().await;
            }
        }
    }
}
