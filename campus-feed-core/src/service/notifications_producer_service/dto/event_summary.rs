use crate::dto::UserId;
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

///
/// Part of the event the approval flow needs
///
#[derive(Debug, Clone)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub created_by: UserId,
}
