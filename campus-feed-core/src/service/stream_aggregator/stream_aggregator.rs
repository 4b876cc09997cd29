use super::{partitions_listener::PartitionsListener, readable_partitions, PartitionSnapshots};
use crate::{
    auth::Role,
    dto::UserId,
    repository::NotificationsRepository,
    service::NotificationStore,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::{
    sync::{Mutex, Notify},
    task::JoinHandle,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Idle,
    Listening,
}

///
/// Feeds [NotificationStore] with merge of personal, broadcast
/// and role scoped notifications of one identity.
///
/// At most one listener exists at a time.
/// It is torn down before a new one starts and on sign out.
///
pub struct StreamAggregator {
    repository: Arc<dyn NotificationsRepository>,
    store: Arc<NotificationStore>,

    listener: Mutex<Option<ListenerHandle>>,
}

struct ListenerHandle {
    identity: UserId,
    close_notify: Arc<Notify>,
    handle: JoinHandle<()>,
}

impl StreamAggregator {
    pub fn new(repository: Arc<dyn NotificationsRepository>, store: Arc<NotificationStore>) -> Self {
        Self {
            repository,
            store,
            listener: Mutex::new(None),
        }
    }

    ///
    /// Fetches every readable partition once and replaces the feed with their merge.
    /// Failed partition is treated as empty.
    ///
    /// ### Returns
    /// false when the identity changed before the fetch completed,
    /// results are discarded then
    ///
    #[tracing::instrument(name = "Refresh feed", skip_all, fields(%identity, ?role))]
    pub async fn refresh(&self, identity: &UserId, role: Option<Role>) -> bool {
        self.close_listener_of_other_identity(identity).await;

        let token = self.store.begin_session(identity).await;
        let partitions = readable_partitions(identity, role);

        let results = join_all(partitions.iter().map(|(partition, scope)| async move {
            match self.repository.query_by_scope(scope).await {
                Ok(notifications) => {
                    tracing::debug!(
                        partition = partition.as_ref(),
                        count = notifications.len(),
                        "partition fetched"
                    );
                    notifications
                }
                Err(err) => {
                    tracing::warn!(
                        partition = partition.as_ref(),
                        %err,
                        "partition fetch failed, partition degraded to empty"
                    );
                    Vec::new()
                }
            }
        }))
        .await;

        let mut snapshots = PartitionSnapshots::default();
        for ((partition, _), notifications) in partitions.into_iter().zip(results) {
            snapshots.set(partition, notifications);
        }

        self.store.apply(&token, snapshots.merge()).await
    }

    ///
    /// Opens watch over every readable partition
    /// and keeps the feed merged until [StreamAggregator::stop].
    /// Previous listener is torn down first.
    ///
    #[tracing::instrument(name = "Subscribe feed", skip_all, fields(%identity, ?role))]
    pub async fn subscribe(&self, identity: &UserId, role: Option<Role>) {
        let mut listener = self.listener.lock().await;
        if let Some(previous) = listener.take() {
            Self::close_listener(previous).await;
        }

        let token = self.store.begin_session(identity).await;

        let mut watches = Vec::new();
        for (partition, scope) in readable_partitions(identity, role) {
            match self.repository.watch_by_scope(&scope).await {
                Ok(watch) => watches.push((partition, watch)),
                Err(err) => {
                    tracing::warn!(
                        partition = partition.as_ref(),
                        %err,
                        "failed to open partition watch, partition degraded to empty"
                    );
                }
            }
        }
        tracing::info!(watches = watches.len(), "listening");

        let close_notify = Arc::new(Notify::new());
        let partitions_listener = PartitionsListener::new(Arc::clone(&self.store), token, watches);
        let handle = tokio::spawn(partitions_listener.run(Arc::clone(&close_notify)));

        *listener = Some(ListenerHandle {
            identity: identity.clone(),
            close_notify,
            handle,
        });
    }

    ///
    /// Closes every open watch. Feed keeps its last content.
    ///
    pub async fn stop(&self) {
        let listener = self.listener.lock().await.take();
        if let Some(listener) = listener {
            Self::close_listener(listener).await;
        }
    }

    ///
    /// Closes every open watch and clears the feed.
    /// Results still in flight are discarded when they arrive.
    ///
    pub async fn sign_out(&self) {
        self.stop().await;
        self.store.end_session().await;
    }

    pub async fn state(&self) -> SubscriptionState {
        let listener = self.listener.lock().await;

        match listener.as_ref() {
            Some(listener) if !listener.handle.is_finished() => SubscriptionState::Listening,
            _ => SubscriptionState::Idle,
        }
    }

    async fn close_listener_of_other_identity(&self, identity: &UserId) {
        let mut listener = self.listener.lock().await;

        let is_other_identity = listener
            .as_ref()
            .is_some_and(|listener| listener.identity != *identity);

        if is_other_identity {
            if let Some(previous) = listener.take() {
                Self::close_listener(previous).await;
            }
        }
    }

    async fn close_listener(listener: ListenerHandle) {
        tracing::debug!(identity = %listener.identity, "closing listener");

        listener.close_notify.notify_one();
        if let Err(err) = listener.handle.await {
            tracing::error!(%err, "listener task failed");
        }
    }
}
