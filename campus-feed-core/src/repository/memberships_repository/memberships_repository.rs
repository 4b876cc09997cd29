use crate::{
    dto::{SubjectRef, UserId},
    repository::Error,
};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipsRepository: Send + Sync {
    ///
    /// Adds actor to members of the subject when absent, removes otherwise.
    /// Membership and denormalized count of the subject are changed
    /// in a single indivisible write.
    ///
    /// ### Returns
    /// Membership of the actor after the toggle
    ///
    /// ### Errors
    /// - [Error::NoDocumentFound] when subject does not exist
    /// - [Error::NoDocumentUpdated] when toggle kept losing races with other writers
    ///
    async fn toggle_membership(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error>;

    async fn is_member(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error>;

    ///
    /// Reads denormalized count of the subject
    ///
    /// ### Errors
    /// - [Error::NoDocumentFound] when subject does not exist
    ///
    async fn get_count(&self, subject: &SubjectRef) -> Result<u64, Error>;
}
