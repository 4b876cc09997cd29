mod entity;
mod notifications_repository;
mod notifications_repository_impl;
mod scope_snapshot_source;

pub use notifications_repository::*;
pub use notifications_repository_impl::*;
