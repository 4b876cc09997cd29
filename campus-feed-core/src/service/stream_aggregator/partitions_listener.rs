use super::{Partition, PartitionSnapshots};
use crate::{
    repository::NotificationsWatch,
    service::{NotificationStore, SessionToken},
};
use futures::{stream::select_all, StreamExt};
use std::sync::Arc;
use tokio::sync::Notify;

///
/// Re-merges all partitions every time any of the watches delivers a snapshot
///
pub struct PartitionsListener {
    store: Arc<NotificationStore>,
    token: SessionToken,
    watches: Vec<(Partition, NotificationsWatch)>,
}

impl PartitionsListener {
    pub fn new(
        store: Arc<NotificationStore>,
        token: SessionToken,
        watches: Vec<(Partition, NotificationsWatch)>,
    ) -> Self {
        Self {
            store,
            token,
            watches,
        }
    }

    #[tracing::instrument(
        name = "Partitions Listener",
        skip_all,
        fields(identity = %self.token.identity())
    )]
    pub async fn run(self, close_notify: Arc<Notify>) {
        let Self {
            store,
            token,
            watches,
        } = self;

        let mut deliveries = select_all(watches.into_iter().map(|(partition, watch)| {
            watch.map(move |snapshot| (partition, snapshot))
        }));
        let mut snapshots = PartitionSnapshots::default();

        tokio::select! {
            biased;

            // Wait for signal to close
            _ = close_notify.notified() => {
                tracing::debug!("listener closed");
            },

            // Merge until every watch ends or session changes
            _ = async {
                while let Some((partition, snapshot)) = deliveries.next().await {
                    match snapshot {
                        Ok(notifications) => {
                            tracing::trace!(
                                partition = partition.as_ref(),
                                count = notifications.len(),
                                "snapshot delivered"
                            );
                            snapshots.set(partition, notifications);
                        }
                        Err(err) => {
                            tracing::warn!(
                                partition = partition.as_ref(),
                                %err,
                                "partition watch failed, partition degraded to empty"
                            );
                            snapshots.set(partition, Vec::new());
                        }
                    }

                    if !store.apply(&token, snapshots.merge()).await {
                        tracing::debug!("session no longer current");
                        return;
                    }
                }
                tracing::debug!("all partition watches ended");
            } => {}
        }
    }
}
