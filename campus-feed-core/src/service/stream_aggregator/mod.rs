mod partitions;
mod partitions_listener;
mod stream_aggregator;

pub use partitions::*;
pub use stream_aggregator::*;
