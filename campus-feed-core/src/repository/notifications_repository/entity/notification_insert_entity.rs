use crate::dto::{RelatedEntity, Severity};
use bson::DateTime;
use serde::Serialize;

#[derive(Serialize)]
pub struct NotificationInsertEntity {
    pub recipient: String,
    pub title: String,
    pub body: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: DateTime,
    pub related_entity: Option<RelatedEntity>,
}
