use super::{EventStatus, EventSummary};
use crate::{
    auth::Role,
    dto::{Notification, RelatedEntity},
    error::Error,
};
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsProducerService: Send + Sync {
    ///
    /// Tells creator of the event about the moderation decision.
    ///
    /// ### Returns
    /// Created notification
    ///
    /// ### Errors
    /// - [Error::Validation] when
    ///     - status is still pending
    ///     - event title is blank
    ///
    /// Message is generated, so configured length limits don't apply to it.
    ///
    async fn notify_event_status(
        &self,
        event: &EventSummary,
        status: EventStatus,
    ) -> Result<Notification, Error>;

    ///
    /// Sends announcement to every user.
    ///
    /// ### Errors
    /// - [Error::MissingRole] when sender is not an admin
    /// - [Error::Validation] when title or body is blank
    /// - [Error::ValidationTooLong] when title or body is too long
    ///
    async fn send_announcement(
        &self,
        sender_role: Option<Role>,
        title: String,
        body: String,
    ) -> Result<Notification, Error>;

    ///
    /// Sends moderation notice to admins.
    ///
    /// ### Errors
    /// - [Error::Validation] when title or body is blank
    /// - [Error::ValidationTooLong] when title or body is too long
    ///
    async fn notify_admins(
        &self,
        title: String,
        body: String,
        related_entity: Option<RelatedEntity>,
    ) -> Result<Notification, Error>;
}
