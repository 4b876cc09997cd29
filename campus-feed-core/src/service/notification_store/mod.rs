mod dto;
mod notification_store;
mod read_state_reconciler;

pub use dto::{NotificationStoreConfig, ReadStateReconcilerConfig, SessionToken};
pub use notification_store::*;
pub use read_state_reconciler::*;
