use super::{Notification, UserId};

///
/// Snapshot of the merged feed published to readers.
/// Snapshot is replaced as a whole, so readers never observe partial merge.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationsFeed {
    pub identity: Option<UserId>,
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

impl NotificationsFeed {
    pub fn new(identity: Option<UserId>, notifications: Vec<Notification>) -> Self {
        let unread_count = notifications
            .iter()
            .filter(|notification| !notification.is_read)
            .count();

        Self {
            identity,
            notifications,
            unread_count,
        }
    }
}
