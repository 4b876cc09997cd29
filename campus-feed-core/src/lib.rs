//!
//! Notification feed and membership counters of the campus app.
//!
//! The binary runs the consuming side for one identity: merged feed,
//! read state and membership status of watched subjects.
//! [service::NotificationsProducerService] is meant to be embedded
//! by the producing side (event moderation, announcements).
//!

pub mod auth;
pub mod dto;
pub mod error;
pub mod repository;
pub mod service;
