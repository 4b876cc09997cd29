use crate::{auth::Role, repository};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("validation error: {field} too long {len}/{max_len}")]
    ValidationTooLong {
        field: &'static str,
        len: usize,
        max_len: usize,
    },

    #[error("auth error: missing role: {}", .0.as_ref())]
    MissingRole(Role),

    #[error("database error: {0}")]
    Database(#[from] repository::Error),
}
