use crate::{
    dto::{NewNotification, Notification, NotificationId, RecipientScope},
    repository::Error,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

///
/// Stream of full result sets of one scope.
/// New item is delivered every time anything in the scope changes.
///
pub type NotificationsWatch = BoxStream<'static, Result<Vec<Notification>, Error>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationsRepository: Send + Sync {
    ///
    /// Finds all notifications addressed to the scope.
    /// Order of returned notifications is not specified.
    ///
    async fn query_by_scope(&self, scope: &RecipientScope) -> Result<Vec<Notification>, Error>;

    ///
    /// Opens watch over notifications addressed to the scope.
    /// Watch is closed when returned stream is dropped.
    ///
    async fn watch_by_scope(&self, scope: &RecipientScope) -> Result<NotificationsWatch, Error>;

    ///
    /// Updates read flag of single notification
    ///
    /// ### Errors
    /// - [Error::InvalidId] when id is not valid document id
    /// - [Error::NoDocumentUpdated] when notification does not exist
    ///
    async fn update_read(&self, id: &NotificationId, is_read: bool) -> Result<(), Error>;

    ///
    /// Inserts new unread notification created now
    ///
    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error>;
}
