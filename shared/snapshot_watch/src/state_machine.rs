use crate::{retry::retry, ChangeStream, SnapshotSource, SnapshotWatchConfig};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

pub struct StateMachine<S: SnapshotSource> {
    config: SnapshotWatchConfig,

    source: S,
    changes: Option<ChangeStream>,

    snapshots_tx: mpsc::UnboundedSender<anyhow::Result<Vec<S::Item>>>,

    state: State,
}

impl<S: SnapshotSource> StateMachine<S> {
    pub fn new(
        config: SnapshotWatchConfig,
        source: S,
        snapshots_tx: mpsc::UnboundedSender<anyhow::Result<Vec<S::Item>>>,
    ) -> Self {
        Self {
            config,
            source,
            changes: None,
            snapshots_tx,
            state: State::Subscribing,
        }
    }

    ///
    /// Infinite loop that keeps snapshots flowing.
    /// Loop stops when notify is used or when the receiving side is dropped.
    ///
    #[tracing::instrument(name = "Snapshot Watch", target = "snapshot_watch", skip_all)]
    pub async fn run(mut self, stop: Arc<Notify>) {
        tracing::debug!("state machine started");

        let snapshots_tx = self.snapshots_tx.clone();

        tokio::select! {
            biased;
            _ = stop.notified() => {
                tracing::debug!("watch closed");
            }
            _ = snapshots_tx.closed() => {
                tracing::debug!("watch dropped by receiver");
            }
            _ = async { loop {
                match self.state {
                    State::Subscribing => {
                        tracing::trace!("state: Subscribing");
                        self.subscribing_state().await;
                    }
                    State::Publishing => {
                        tracing::trace!("state: Publishing");
                        self.publishing_state().await;
                    }
                    State::AwaitingChange => {
                        tracing::trace!("state: AwaitingChange");
                        self.awaiting_change_state().await;
                    }
                }
            }} => {}
        }

        tracing::debug!("state machine finished");
    }

    async fn subscribing_state(&mut self) {
        self.changes = None;

        let changes = retry(
            self.config.retry_interval,
            |attempt| tracing::debug!(attempt, "opening change stream"),
            |attempt, err: anyhow::Error| tracing::warn!(attempt, %err, "failed to open change stream"),
            || self.source.changes(),
        )
        .await;
        tracing::debug!("change stream opened");

        self.changes = Some(changes);
        self.state = State::Publishing;
    }

    async fn publishing_state(&mut self) {
        match self.source.snapshot().await {
            Ok(items) => {
                tracing::trace!(count = items.len(), "publishing snapshot");
                let _ = self.snapshots_tx.send(Ok(items));
                self.state = State::AwaitingChange;
            }
            Err(err) => {
                tracing::warn!(%err, "failed to read snapshot");
                let _ = self.snapshots_tx.send(Err(err));

                tokio::time::sleep(self.config.retry_interval).await;
                self.state = State::Subscribing;
            }
        }
    }

    async fn awaiting_change_state(&mut self) {
        let Some(changes) = self.changes.as_mut() else {
            self.state = State::Subscribing;
            return;
        };

        match changes.next().await {
            Some(Ok(())) => {
                tracing::trace!("change received");
                self.state = State::Publishing;
            }
            Some(Err(err)) => {
                tracing::warn!(%err, "change stream failed");
                let _ = self.snapshots_tx.send(Err(err));
                self.state = State::Subscribing;
            }
            None => {
                tracing::warn!("change stream ended");
                self.state = State::Subscribing;
            }
        }
    }
}

enum State {
    Subscribing,
    Publishing,
    AwaitingChange,
}
