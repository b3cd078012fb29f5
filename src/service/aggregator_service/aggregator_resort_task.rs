use super::aggregator_state::AggregatorState;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, Notify},
    time::{interval, Interval, MissedTickBehavior},
};

pub struct AggregatorResortTask {
    state: Arc<Mutex<AggregatorState>>,

    interval: Interval,
}

impl AggregatorResortTask {
    pub fn new(resort_interval: Duration, state: Arc<Mutex<AggregatorState>>) -> Self {
        let mut interval = interval(resort_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { state, interval }
    }

    #[tracing::instrument(name = "Aggregator Resort", skip_all)]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        tokio::select! {
            biased;

            // Wait for signal to close
            _ = close_notify.notified() => {},

            // Run infinite loop and restore order of the lists periodically
            _ = async { loop {
                self.interval.tick().await;

                let mut state = self.state.lock().await;
                if state.view.resort() {
                    tracing::debug!("restored order of pushed items");
                    state.publish();
                }
            }} => {}
        }
    }
}
