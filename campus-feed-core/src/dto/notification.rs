use crate::auth::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{AsRefStr, EnumString};
use time::OffsetDateTime;

/// Recipient value of notifications addressed to every user.
pub const BROADCAST_SCOPE_MARKER: &str = "ALL_USERS";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    ///
    /// Identity that collides with one of the scope markers.
    /// Such identity must never be used to read a personal partition.
    ///
    pub fn is_reserved(&self) -> bool {
        self.0 == BROADCAST_SCOPE_MARKER || Role::from_scope_marker(&self.0).is_some()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///
/// Audience of the notification.
/// Determines which partition of the feed the notification belongs to.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipientScope {
    User(UserId),
    Broadcast,
    Role(Role),
}

impl RecipientScope {
    ///
    /// Value kept in the recipient field of the stored notification
    ///
    pub fn scope_value(&self) -> &str {
        match self {
            RecipientScope::User(user_id) => user_id.as_str(),
            RecipientScope::Broadcast => BROADCAST_SCOPE_MARKER,
            RecipientScope::Role(role) => role.scope_marker(),
        }
    }

    pub fn from_scope_value(value: &str) -> Self {
        if value == BROADCAST_SCOPE_MARKER {
            return RecipientScope::Broadcast;
        }

        match Role::from_scope_marker(value) {
            Some(role) => RecipientScope::Role(role),
            None => RecipientScope::User(UserId::new(value)),
        }
    }
}

impl fmt::Display for RecipientScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scope_value())
    }
}

/// Presentation hint only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelatedEntityKind {
    Event,
    Post,
}

///
/// Content the notification deep-links back to
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub kind: RelatedEntityKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub scope: RecipientScope,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: OffsetDateTime,
    pub related_entity: Option<RelatedEntity>,
}

///
/// Notification that is about to be created by one of the producers.
/// Id, read flag and creation time are assigned on insert.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub scope: RecipientScope,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub related_entity: Option<RelatedEntity>,
}
