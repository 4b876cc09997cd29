//!
//! In-memory repositories for tests that must control
//! completion order of the calls or drive watches by hand.
//!

use super::{Error, MembershipsRepository, NotificationsRepository, NotificationsWatch};
use crate::dto::{
    NewNotification, Notification, NotificationId, RecipientScope, SubjectRef, UserId,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Mutex,
    },
};
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};

type SnapshotSender = mpsc::UnboundedSender<Result<Vec<Notification>, Error>>;

#[derive(Default)]
pub struct FakeNotificationsRepository {
    results: Mutex<HashMap<RecipientScope, Vec<Notification>>>,
    failing_scopes: Mutex<HashSet<RecipientScope>>,
    query_gates: Mutex<HashMap<RecipientScope, oneshot::Receiver<()>>>,
    queried_scopes: Mutex<Vec<RecipientScope>>,

    watch_senders: Mutex<Vec<(RecipientScope, SnapshotSender)>>,
    watched_scopes: Mutex<Vec<RecipientScope>>,

    read_updates: Mutex<Vec<(NotificationId, bool)>>,
    read_update_gate: Mutex<Option<oneshot::Receiver<()>>>,
    fail_read_updates: AtomicBool,
    fail_read_updates_transiently: AtomicBool,
}

impl FakeNotificationsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_results(&self, scope: RecipientScope, notifications: Vec<Notification>) {
        self.results.lock().unwrap().insert(scope, notifications);
    }

    pub fn fail_scope(&self, scope: RecipientScope) {
        self.failing_scopes.lock().unwrap().insert(scope);
    }

    ///
    /// Next query of the scope doesn't complete until returned sender is used or dropped
    ///
    pub fn gate_query(&self, scope: RecipientScope) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.query_gates.lock().unwrap().insert(scope, rx);
        tx
    }

    pub fn queried_scopes(&self) -> Vec<RecipientScope> {
        self.queried_scopes.lock().unwrap().clone()
    }

    pub fn watched_scopes(&self) -> Vec<RecipientScope> {
        self.watched_scopes.lock().unwrap().clone()
    }

    ///
    /// Delivers snapshot through the latest watch of the scope
    ///
    pub fn push_snapshot(&self, scope: &RecipientScope, snapshot: Result<Vec<Notification>, Error>) {
        let watch_senders = self.watch_senders.lock().unwrap();
        let latest = watch_senders
            .iter()
            .rev()
            .find(|(watched_scope, _)| watched_scope == scope);

        if let Some((_, tx)) = latest {
            let _ = tx.send(snapshot);
        }
    }

    ///
    /// Number of watches not yet dropped by their consumer
    ///
    pub fn open_watches(&self) -> usize {
        self.watch_senders
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }

    pub fn read_updates(&self) -> Vec<(NotificationId, bool)> {
        self.read_updates.lock().unwrap().clone()
    }

    pub fn gate_read_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.read_update_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_read_updates(&self, fail: bool) {
        self.fail_read_updates.store(fail, Ordering::SeqCst);
    }

    ///
    /// Read updates fail with an error worth retrying
    ///
    pub fn fail_read_updates_transiently(&self, fail: bool) {
        self.fail_read_updates_transiently
            .store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationsRepository for FakeNotificationsRepository {
    async fn query_by_scope(&self, scope: &RecipientScope) -> Result<Vec<Notification>, Error> {
        self.queried_scopes.lock().unwrap().push(scope.clone());

        let gate = self.query_gates.lock().unwrap().remove(scope);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.failing_scopes.lock().unwrap().contains(scope) {
            return Err(Error::Watch(anyhow::anyhow!("scope {scope} unavailable")));
        }

        let results = self.results.lock().unwrap();
        Ok(results.get(scope).cloned().unwrap_or_default())
    }

    async fn watch_by_scope(&self, scope: &RecipientScope) -> Result<NotificationsWatch, Error> {
        self.watched_scopes.lock().unwrap().push(scope.clone());

        if self.failing_scopes.lock().unwrap().contains(scope) {
            return Err(Error::Watch(anyhow::anyhow!("scope {scope} unavailable")));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.watch_senders.lock().unwrap().push((scope.clone(), tx));

        let watch = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|snapshot| (snapshot, rx))
        })
        .boxed();

        Ok(watch)
    }

    async fn update_read(&self, id: &NotificationId, is_read: bool) -> Result<(), Error> {
        let gate = self.read_update_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.read_updates.lock().unwrap().push((id.clone(), is_read));

        if self.fail_read_updates_transiently.load(Ordering::SeqCst) {
            return Err(Error::Watch(anyhow::anyhow!("backend offline")));
        }

        match self.fail_read_updates.load(Ordering::SeqCst) {
            true => Err(Error::NoDocumentUpdated),
            false => Ok(()),
        }
    }

    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error> {
        let mut results = self.results.lock().unwrap();
        let scope_results = results.entry(notification.scope.clone()).or_default();

        let inserted = Notification {
            id: NotificationId::new(format!("inserted-{}", scope_results.len())),
            scope: notification.scope,
            title: notification.title,
            body: notification.body,
            severity: notification.severity,
            is_read: false,
            created_at: OffsetDateTime::now_utc(),
            related_entity: notification.related_entity,
        };
        scope_results.push(inserted.clone());

        Ok(inserted)
    }
}

#[derive(Default)]
pub struct FakeMembershipsRepository {
    members: Mutex<HashMap<SubjectRef, HashSet<UserId>>>,
    counts: Mutex<HashMap<SubjectRef, u64>>,

    toggle_gate: Mutex<Option<oneshot::Receiver<()>>>,
    toggles: AtomicU32,
    count_gate: Mutex<Option<oneshot::Receiver<()>>>,
    count_reads: AtomicU32,
    fail_toggles: AtomicBool,
    fail_reads: AtomicBool,
    fail_counts: AtomicBool,
}

impl FakeMembershipsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Count is seeded separately because other members are not known to the test
    ///
    pub fn seed(&self, subject: &SubjectRef, members: &[&str], count: u64) {
        self.members.lock().unwrap().insert(
            subject.clone(),
            members.iter().map(|member| UserId::new(*member)).collect(),
        );
        self.counts.lock().unwrap().insert(subject.clone(), count);
    }

    pub fn server_state(&self, subject: &SubjectRef, actor: &UserId) -> (bool, u64) {
        let is_member = self
            .members
            .lock()
            .unwrap()
            .get(subject)
            .map(|members| members.contains(actor))
            .unwrap_or(false);
        let count = self
            .counts
            .lock()
            .unwrap()
            .get(subject)
            .copied()
            .unwrap_or(0);

        (is_member, count)
    }

    pub fn gate_toggle(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.toggle_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn toggles(&self) -> u32 {
        self.toggles.load(Ordering::SeqCst)
    }

    ///
    /// Next count read takes the value immediately,
    /// but doesn't return it until returned sender is used or dropped
    ///
    pub fn gate_count(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.count_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn count_reads(&self) -> u32 {
        self.count_reads.load(Ordering::SeqCst)
    }

    pub fn fail_toggles(&self, fail: bool) {
        self.fail_toggles.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MembershipsRepository for FakeMembershipsRepository {
    async fn toggle_membership(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error> {
        self.toggles.fetch_add(1, Ordering::SeqCst);

        let gate = self.toggle_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.fail_toggles.load(Ordering::SeqCst) {
            return Err(Error::NoDocumentUpdated);
        }

        let mut members = self.members.lock().unwrap();
        let mut counts = self.counts.lock().unwrap();
        let members = members.entry(subject.clone()).or_default();
        let count = counts.entry(subject.clone()).or_default();

        match members.remove(actor) {
            true => {
                *count = count.saturating_sub(1);
                Ok(false)
            }
            false => {
                members.insert(actor.clone());
                *count += 1;
                Ok(true)
            }
        }
    }

    async fn is_member(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::NoDocumentFound);
        }

        Ok(self.server_state(subject, actor).0)
    }

    async fn get_count(&self, subject: &SubjectRef) -> Result<u64, Error> {
        self.count_reads.fetch_add(1, Ordering::SeqCst);

        if self.fail_reads.load(Ordering::SeqCst) || self.fail_counts.load(Ordering::SeqCst) {
            return Err(Error::NoDocumentFound);
        }

        let count = self.counts.lock().unwrap().get(subject).copied().unwrap_or(0);

        let gate = self.count_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        Ok(count)
    }
}
