use async_trait::async_trait;
use futures::stream::BoxStream;

///
/// Stream of change signals. Each item means "the result set may have changed".
/// An error or the end of the stream means the stream has to be reopened.
///
pub type ChangeStream = BoxStream<'static, anyhow::Result<()>>;

///
/// Query whose full result set can be read on demand
/// and which can signal that the result set changed.
///
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    type Item: Send + 'static;

    ///
    /// Reads the full current result set.
    ///
    async fn snapshot(&self) -> anyhow::Result<Vec<Self::Item>>;

    ///
    /// Opens a stream of change signals.
    /// It is always opened before the snapshot is taken so no change is missed.
    ///
    async fn changes(&self) -> anyhow::Result<ChangeStream>;
}
