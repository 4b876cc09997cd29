mod event_summary;
mod notifications_producer_service_config;

pub use event_summary::*;
pub use notifications_producer_service_config::*;
