mod notification_store;
mod notifications_producer_service;
mod optimistic_counter;
mod stream_aggregator;

pub use notification_store::*;
pub use notifications_producer_service::*;
pub use optimistic_counter::*;
pub use stream_aggregator::*;
