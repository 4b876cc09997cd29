use super::{NotificationStore, ReadStateReconcilerConfig};
use std::sync::Arc;
use tokio::{
    sync::Notify,
    time::{interval, Interval, MissedTickBehavior},
};

///
/// Periodically pushes read flags that failed to reach the backend
///
pub struct ReadStateReconciler {
    store: Arc<NotificationStore>,

    interval: Interval,
}

impl ReadStateReconciler {
    pub fn new(config: ReadStateReconcilerConfig, store: Arc<NotificationStore>) -> Self {
        let mut interval = interval(config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self { store, interval }
    }

    #[tracing::instrument(name = "Read State Reconciler", skip_all)]
    pub async fn run(mut self, close_notify: Arc<Notify>) {
        tokio::select! {
            biased;

            // Wait for signal to close
            _ = close_notify.notified() => {},

            // Run infinite loop and sync read state periodically
            _ = async { loop {
                self.interval.tick().await;

                tracing::debug!("reconciliation started");
                let synced = self.store.reconcile_read_state().await;
                let pending = self.store.pending_read_syncs().await;
                tracing::debug!(synced, pending, "reconciliation finished");
            }} => {}
        }
    }
}
