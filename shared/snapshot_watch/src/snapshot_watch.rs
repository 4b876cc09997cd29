use crate::{state_machine::StateMachine, SnapshotSource};
use futures::Stream;
use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};
use tokio::{
    sync::{mpsc, Notify},
    task::JoinHandle,
};

#[derive(Debug, Clone)]
pub struct SnapshotWatchConfig {
    pub retry_interval: Duration,
}

///
/// Watch over a [SnapshotSource].
/// It runs background task that delivers full snapshot of the source
/// every time the source signals a change, and reopens the change stream
/// whenever it fails.
///
/// Snapshots are read by polling the watch as a [Stream].
/// Dropping the watch stops the background task.
///
pub struct SnapshotWatch<T> {
    snapshots_rx: mpsc::UnboundedReceiver<anyhow::Result<Vec<T>>>,

    watch_handle: JoinHandle<()>,
    close_notify: Arc<Notify>,
}

impl<T: Send + 'static> SnapshotWatch<T> {
    pub fn new<S>(config: SnapshotWatchConfig, source: S) -> Self
    where
        S: SnapshotSource<Item = T>,
    {
        let (snapshots_tx, snapshots_rx) = mpsc::unbounded_channel();
        let close_notify = Arc::new(Notify::new());
        let state_machine = StateMachine::new(config, source, snapshots_tx);

        let close_notify_clone = Arc::clone(&close_notify);
        let watch_handle = tokio::spawn(async move {
            state_machine.run(close_notify_clone).await;
        });

        Self {
            snapshots_rx,
            watch_handle,
            close_notify,
        }
    }

    ///
    /// Stops background task and waits until it finishes.
    ///
    pub async fn close(self) {
        self.close_notify.notify_one();
        if let Err(err) = self.watch_handle.await {
            tracing::error!(%err, "snapshot watch task failed");
        }
    }
}

impl<T> Stream for SnapshotWatch<T> {
    type Item = anyhow::Result<Vec<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().snapshots_rx.poll_recv(cx)
    }
}
