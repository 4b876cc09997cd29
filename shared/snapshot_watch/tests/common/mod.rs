use async_trait::async_trait;
use futures::StreamExt;
use snapshot_watch::{ChangeStream, SnapshotSource};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc, Mutex, Once,
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::level_filters::LevelFilter;

static INIT_TRACING_ONCE: Once = Once::new();

pub fn init_test_environment() {
    INIT_TRACING_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(LevelFilter::TRACE)
            .with_target(false)
            .with_test_writer()
            .init();
    });
}

pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

///
/// In-memory source whose content and change signals are controlled by the test.
///
#[derive(Clone, Default)]
pub struct TestSource {
    inner: Arc<TestSourceInner>,
}

#[derive(Default)]
struct TestSourceInner {
    items: Mutex<Vec<String>>,
    change_senders: Mutex<Vec<mpsc::UnboundedSender<anyhow::Result<()>>>>,
    subscriptions: AtomicU32,
    fail_snapshots: AtomicBool,
    fail_subscriptions: AtomicBool,
}

impl TestSource {
    pub fn with_items(items: &[&str]) -> Self {
        let source = Self::default();
        source.set_items(items);
        source
    }

    pub fn set_items(&self, items: &[&str]) {
        *self.inner.items.lock().unwrap() = items.iter().map(|item| item.to_string()).collect();
    }

    pub fn signal_change(&self) {
        if let Some(tx) = self.inner.change_senders.lock().unwrap().last() {
            let _ = tx.send(Ok(()));
        }
    }

    pub fn fail_change_stream(&self) {
        if let Some(tx) = self.inner.change_senders.lock().unwrap().last() {
            let _ = tx.send(Err(anyhow::anyhow!("change stream interrupted")));
        }
    }

    pub fn end_change_streams(&self) {
        self.inner.change_senders.lock().unwrap().clear();
    }

    pub fn fail_snapshots(&self, fail: bool) {
        self.inner.fail_snapshots.store(fail, Ordering::SeqCst);
    }

    pub fn fail_subscriptions(&self, fail: bool) {
        self.inner.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    pub fn subscriptions(&self) -> u32 {
        self.inner.subscriptions.load(Ordering::SeqCst)
    }

    pub fn open_change_streams(&self) -> usize {
        self.inner
            .change_senders
            .lock()
            .unwrap()
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

#[async_trait]
impl SnapshotSource for TestSource {
    type Item = String;

    async fn snapshot(&self) -> anyhow::Result<Vec<String>> {
        if self.inner.fail_snapshots.load(Ordering::SeqCst) {
            anyhow::bail!("snapshot unavailable");
        }

        Ok(self.inner.items.lock().unwrap().clone())
    }

    async fn changes(&self) -> anyhow::Result<ChangeStream> {
        self.inner.subscriptions.fetch_add(1, Ordering::SeqCst);
        if self.inner.fail_subscriptions.load(Ordering::SeqCst) {
            anyhow::bail!("change stream unavailable");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.change_senders.lock().unwrap().push(tx);

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|change| (change, rx))
        });

        Ok(stream.boxed())
    }
}
