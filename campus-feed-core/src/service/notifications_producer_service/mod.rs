mod dto;
mod notifications_producer_service;
mod notifications_producer_service_impl;

pub use dto::{EventStatus, EventSummary, NotificationsProducerServiceConfig};
pub use notifications_producer_service::*;
pub use notifications_producer_service_impl::*;
