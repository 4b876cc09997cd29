use super::{NotificationStoreConfig, SessionToken};
use crate::{
    dto::{Notification, NotificationId, NotificationsFeed, UserId},
    repository::{self, NotificationsRepository},
};
use futures::future::join_all;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{watch, Mutex};

///
/// Owner of the merged feed of one signed-in identity.
///
/// Every change is published as a new [NotificationsFeed] snapshot,
/// so readers never observe a partially applied change.
/// Read flag is flipped locally before the backend is told about it.
///
pub struct NotificationStore {
    config: NotificationStoreConfig,
    repository: Arc<dyn NotificationsRepository>,

    state: Mutex<StoreState>,
    feed_tx: watch::Sender<Arc<NotificationsFeed>>,
}

#[derive(Default)]
struct StoreState {
    identity: Option<UserId>,
    generation: u64,
    notifications: Vec<Notification>,

    // Read locally, not yet confirmed by the backend.
    // Value is the generation of the session that flipped the flag.
    unsynced_reads: HashMap<NotificationId, u64>,
}

impl StoreState {
    fn start_generation(&mut self, identity: Option<UserId>) {
        self.generation += 1;
        self.identity = identity;
        self.notifications.clear();

        let dropped = self.unsynced_reads.len();
        self.unsynced_reads.clear();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped read syncs of previous session");
        }
    }
}

impl NotificationStore {
    pub fn new(config: NotificationStoreConfig, repository: Arc<dyn NotificationsRepository>) -> Self {
        let (feed_tx, _) = watch::channel(Arc::new(NotificationsFeed::default()));

        Self {
            config,
            repository,
            state: Mutex::new(StoreState::default()),
            feed_tx,
        }
    }

    pub fn feed(&self) -> Arc<NotificationsFeed> {
        Arc::clone(&self.feed_tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<NotificationsFeed>> {
        self.feed_tx.subscribe()
    }

    pub fn unread_count(&self) -> usize {
        self.feed_tx.borrow().unread_count
    }

    ///
    /// Starts session of the identity.
    /// Session of the same identity is continued, so its results stay valid.
    /// Any other identity gets a fresh, empty session.
    ///
    pub async fn begin_session(&self, identity: &UserId) -> SessionToken {
        let mut state = self.state.lock().await;

        if state.identity.as_ref() != Some(identity) {
            state.start_generation(Some(identity.clone()));
            tracing::info!(%identity, generation = state.generation, "session started");

            self.publish(&state);
        }

        SessionToken {
            generation: state.generation,
            identity: identity.clone(),
        }
    }

    ///
    /// Clears the feed and invalidates every issued token
    ///
    pub async fn end_session(&self) {
        let mut state = self.state.lock().await;

        state.start_generation(None);
        tracing::info!(generation = state.generation, "session ended");

        self.publish(&state);
    }

    ///
    /// Replaces the feed with merged notifications.
    /// Notifications are expected in feed order, most recent first.
    ///
    /// ### Returns
    /// false when the token belongs to a session that is no longer current,
    /// the notifications are discarded then
    ///
    #[tracing::instrument(
        name = "Apply merged feed",
        skip_all,
        fields(
            identity = %token.identity,
            generation = token.generation,
        )
    )]
    pub async fn apply(&self, token: &SessionToken, mut merged: Vec<Notification>) -> bool {
        let mut state = self.state.lock().await;

        if token.generation != state.generation {
            tracing::debug!(
                current_generation = state.generation,
                "discarding results of stale session"
            );
            return false;
        }

        for notification in merged.iter_mut() {
            if state.unsynced_reads.get(&notification.id) == Some(&state.generation) {
                notification.is_read = true;
            }
        }
        merged.truncate(self.config.max_notifications);

        tracing::debug!(count = merged.len(), "applying merged feed");
        state.notifications = merged;
        self.publish(&state);

        true
    }

    ///
    /// Marks notification as read.
    /// Unknown or already read notification is ignored.
    /// Failed backend update is only logged, local flag stays flipped.
    ///
    #[tracing::instrument(name = "Mark as read", skip_all, fields(%id))]
    pub async fn mark_as_read(&self, id: &NotificationId) {
        let flipped = self
            .flip_unread(|notification| notification.id == *id)
            .await;

        let Some((_, generation)) = flipped else {
            tracing::debug!("nothing to mark");
            return;
        };

        self.sync_read(id, generation).await;
    }

    ///
    /// Marks every loaded notification as read.
    /// Backend is updated one notification at a time, so some updates may fail.
    ///
    #[tracing::instrument(name = "Mark all as read", skip_all)]
    pub async fn mark_all_as_read(&self) {
        let Some((flipped, generation)) = self.flip_unread(|_| true).await else {
            tracing::debug!("nothing to mark");
            return;
        };
        tracing::debug!(count = flipped.len(), "marked locally");

        let synced = join_all(flipped.iter().map(|id| self.sync_read(id, generation)))
            .await
            .into_iter()
            .filter(|synced| *synced)
            .count();

        tracing::info!(count = flipped.len(), synced, "marked all as read");
    }

    ///
    /// Retries every read flag update that didn't reach the backend.
    ///
    /// ### Returns
    /// Number of synced notifications
    ///
    #[tracing::instrument(name = "Reconcile read state", skip_all)]
    pub async fn reconcile_read_state(&self) -> usize {
        let pending = {
            let state = self.state.lock().await;
            state
                .unsynced_reads
                .iter()
                .map(|(id, generation)| (id.clone(), *generation))
                .collect::<Vec<_>>()
        };

        if pending.is_empty() {
            return 0;
        }

        let synced = join_all(
            pending
                .iter()
                .map(|(id, generation)| self.sync_read(id, *generation)),
        )
        .await
            .into_iter()
            .filter(|synced| *synced)
            .count();

        tracing::info!(pending = pending.len(), synced, "reconciled read state");

        synced
    }

    pub async fn pending_read_syncs(&self) -> usize {
        self.state.lock().await.unsynced_reads.len()
    }

    ///
    /// Flips read flag of every unread notification matching predicate
    /// and publishes the change before returning
    ///
    /// ### Returns
    /// flipped ids with the generation of the session they belong to,
    /// None when nothing was flipped
    ///
    async fn flip_unread<P>(&self, predicate: P) -> Option<(Vec<NotificationId>, u64)>
    where
        P: Fn(&Notification) -> bool,
    {
        let mut state = self.state.lock().await;

        let mut flipped = Vec::new();
        for notification in state.notifications.iter_mut() {
            if !notification.is_read && predicate(notification) {
                notification.is_read = true;
                flipped.push(notification.id.clone());
            }
        }

        if flipped.is_empty() {
            return None;
        }

        let generation = state.generation;
        state
            .unsynced_reads
            .extend(flipped.iter().map(|id| (id.clone(), generation)));
        self.publish(&state);

        Some((flipped, generation))
    }

    async fn sync_read(&self, id: &NotificationId, generation: u64) -> bool {
        let result = self.repository.update_read(id, true).await;

        match result {
            Ok(()) => {
                self.forget_unsynced_read(id, generation).await;
                tracing::debug!(%id, "read state synced");
                true
            }
            Err(err @ (repository::Error::NoDocumentUpdated | repository::Error::InvalidId(_))) => {
                // Nothing left to sync on the backend
                self.forget_unsynced_read(id, generation).await;
                tracing::warn!(%id, %err, "notification missing on backend");
                false
            }
            Err(err) => {
                tracing::warn!(%id, %err, "failed to sync read state");
                false
            }
        }
    }

    async fn forget_unsynced_read(&self, id: &NotificationId, generation: u64) {
        let mut state = self.state.lock().await;
        if state.unsynced_reads.get(id) == Some(&generation) {
            state.unsynced_reads.remove(id);
        }
    }

    fn publish(&self, state: &StoreState) {
        let feed = NotificationsFeed::new(state.identity.clone(), state.notifications.clone());
        self.feed_tx.send_replace(Arc::new(feed));
    }
}
