use crate::{
    dto::{CounterPhase, MembershipKey, MembershipState, ToggleOutcome},
    error::Error,
    repository::MembershipsRepository,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::sync::Mutex;

///
/// Membership toggles (interest in events, likes of posts)
/// applied locally before the backend confirms them.
///
/// Every key runs its own `Idle -> Optimistic -> Reconciled | RolledBack` cycle.
/// While a key is `Optimistic` further toggles of that key are dropped.
///
pub struct OptimisticCounter {
    repository: Arc<dyn MembershipsRepository>,

    entries: Mutex<HashMap<MembershipKey, CounterEntry>>,
    next_version: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    state: MembershipState,
    phase: CounterPhase,

    // Identifies the last toggle of the key, 0 when never toggled
    version: u64,
}

impl OptimisticCounter {
    pub fn new(repository: Arc<dyn MembershipsRepository>) -> Self {
        Self {
            repository,
            entries: Mutex::new(HashMap::new()),
            next_version: AtomicU64::new(1),
        }
    }

    ///
    /// Fetches membership and count from the backend and seeds local state with them.
    /// Local state is left untouched when a toggle of the key started
    /// after the reads, or is still in flight.
    ///
    /// ### Errors
    /// - [Error::Database] when any of the reads fails
    ///
    #[tracing::instrument(
        name = "Membership status",
        skip_all,
        fields(
            kind = key.subject.kind.as_ref(),
            subject = %key.subject.id,
            actor = %key.actor,
        )
    )]
    pub async fn status(&self, key: &MembershipKey) -> Result<MembershipState, Error> {
        let read_version = self.entries.lock().await.get(key).map(|entry| entry.version);

        let (is_member, count) = tokio::try_join!(
            self.repository.is_member(&key.subject, &key.actor),
            self.repository.get_count(&key.subject),
        )?;
        let state = MembershipState { is_member, count };

        let mut entries = self.entries.lock().await;
        let current = entries.get(key).map(|entry| (entry.phase, entry.version));
        match current {
            Some((CounterPhase::Optimistic, _)) => {
                tracing::debug!("toggle in flight, local state kept");
            }
            Some((_, version)) if version != read_version.unwrap_or(0) => {
                tracing::debug!("toggled since the reads, local state kept");
            }
            current => {
                let version = current.map(|(_, version)| version).unwrap_or(0);
                entries.insert(
                    key.clone(),
                    CounterEntry {
                        state,
                        phase: CounterPhase::Idle,
                        version,
                    },
                );
            }
        }

        Ok(state)
    }

    ///
    /// Flips membership locally, then asks the backend to do the same.
    ///
    /// Backend answer overwrites local membership and count is fetched again.
    /// When backend fails, local state is restored to the one before the toggle.
    ///
    #[tracing::instrument(
        name = "Toggle membership",
        skip_all,
        fields(
            kind = key.subject.kind.as_ref(),
            subject = %key.subject.id,
            actor = %key.actor,
        )
    )]
    pub async fn toggle(&self, key: &MembershipKey) -> ToggleOutcome {
        if self.current(key).await.is_none() {
            if let Err(err) = self.status(key).await {
                tracing::warn!(%err, "failed to seed membership");
                return ToggleOutcome::Unavailable;
            }
        }

        let (previous, version) = {
            let mut entries = self.entries.lock().await;
            let Some(entry) = entries.get_mut(key) else {
                return ToggleOutcome::Unavailable;
            };

            if entry.phase == CounterPhase::Optimistic {
                tracing::debug!("toggle already in flight");
                return ToggleOutcome::AlreadyInFlight(entry.state);
            }

            let previous = entry.state;
            entry.state = previous.toggled();
            entry.phase = CounterPhase::Optimistic;
            entry.version = self.next_version.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                is_member = entry.state.is_member,
                count = entry.state.count,
                "applied optimistic toggle"
            );

            (previous, entry.version)
        };

        let toggle_result = self
            .repository
            .toggle_membership(&key.subject, &key.actor)
            .await;

        match toggle_result {
            Ok(is_member) => {
                let count = match self.repository.get_count(&key.subject).await {
                    Ok(count) => Some(count),
                    Err(err) => {
                        tracing::warn!(%err, "failed to refetch count, optimistic count kept");
                        None
                    }
                };

                let mut entries = self.entries.lock().await;
                let entry = entries.entry(key.clone()).or_insert(CounterEntry {
                    state: previous.toggled(),
                    phase: CounterPhase::Optimistic,
                    version,
                });
                entry.state.is_member = is_member;
                if let Some(count) = count {
                    entry.state.count = count;
                }
                entry.phase = CounterPhase::Reconciled;

                tracing::info!(
                    is_member,
                    count = entry.state.count,
                    "toggle reconciled"
                );
                ToggleOutcome::Reconciled(entry.state)
            }
            Err(err) => {
                let mut entries = self.entries.lock().await;
                entries.insert(
                    key.clone(),
                    CounterEntry {
                        state: previous,
                        phase: CounterPhase::RolledBack,
                        version,
                    },
                );

                tracing::warn!(%err, "toggle failed, rolled back");
                ToggleOutcome::RolledBack(previous)
            }
        }
    }

    pub async fn current(&self, key: &MembershipKey) -> Option<MembershipState> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|entry| entry.state)
    }

    pub async fn phase(&self, key: &MembershipKey) -> Option<CounterPhase> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|entry| entry.phase)
    }

    ///
    /// Forgets local state of the key. Key with toggle in flight is kept.
    ///
    /// ### Returns
    /// true when the key was removed
    ///
    pub async fn release(&self, key: &MembershipKey) -> bool {
        let mut entries = self.entries.lock().await;

        match entries.get(key) {
            Some(entry) if entry.phase == CounterPhase::Optimistic => false,
            Some(_) => {
                entries.remove(key);
                true
            }
            None => false,
        }
    }
}
