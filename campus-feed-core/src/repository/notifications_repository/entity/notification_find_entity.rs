use crate::dto::{Notification, NotificationId, RecipientScope, RelatedEntity, Severity};
use bson::{oid::ObjectId, DateTime};
use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Deserialize)]
pub struct NotificationFindEntity {
    pub _id: ObjectId,
    pub recipient: String,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: DateTime,

    #[serde(default)]
    pub related_entity: Option<RelatedEntity>,
}

impl From<NotificationFindEntity> for Notification {
    fn from(value: NotificationFindEntity) -> Self {
        Self {
            id: NotificationId::new(value._id.to_hex()),
            scope: RecipientScope::from_scope_value(&value.recipient),
            title: value.title,
            body: value.body,
            severity: value.severity,
            is_read: value.is_read,
            created_at: OffsetDateTime::from(value.created_at),
            related_entity: value.related_entity,
        }
    }
}
