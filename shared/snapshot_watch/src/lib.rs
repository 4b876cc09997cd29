//!
//! Full-snapshot watches over any source that can signal changes.
//!
//! Every change signal triggers a fresh read of the whole result set,
//! so consumers never have to apply deltas.
//!

mod retry;
mod snapshot_source;
mod snapshot_watch;
mod state_machine;

pub use retry::retry;
pub use snapshot_source::{ChangeStream, SnapshotSource};
pub use snapshot_watch::{SnapshotWatch, SnapshotWatchConfig};
