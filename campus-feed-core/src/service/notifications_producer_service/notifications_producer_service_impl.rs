use super::{EventStatus, EventSummary, NotificationsProducerService, NotificationsProducerServiceConfig};
use crate::{
    auth::{require_role, Role},
    dto::{NewNotification, Notification, RecipientScope, RelatedEntity, RelatedEntityKind, Severity},
    error::Error,
    repository::NotificationsRepository,
};
use async_trait::async_trait;
use std::sync::Arc;

const EVENT_STATUS_TITLE: &str = "Event Status Update";

pub struct NotificationsProducerServiceImpl {
    config: NotificationsProducerServiceConfig,
    repository: Arc<dyn NotificationsRepository>,
}

impl NotificationsProducerServiceImpl {
    pub fn new(
        config: NotificationsProducerServiceConfig,
        repository: Arc<dyn NotificationsRepository>,
    ) -> Self {
        Self { config, repository }
    }

    fn validate_content(&self, title: &str, body: &str) -> Result<(), Error> {
        if title.trim().is_empty() {
            return Err(Error::Validation("title is blank"));
        }
        if body.trim().is_empty() {
            return Err(Error::Validation("body is blank"));
        }

        Self::validate_not_too_long("title", title, self.config.max_title_len)?;
        Self::validate_not_too_long("body", body, self.config.max_body_len)?;

        Ok(())
    }

    fn validate_not_too_long(field: &'static str, value: &str, max_len: usize) -> Result<(), Error> {
        let len = value.chars().count();
        if len > max_len {
            return Err(Error::ValidationTooLong {
                field,
                len,
                max_len,
            });
        }

        Ok(())
    }

    ///
    /// Stores notification with content supplied by the caller
    ///
    async fn create(&self, notification: NewNotification) -> Result<Notification, Error> {
        self.validate_content(&notification.title, &notification.body)?;

        self.insert(notification).await
    }

    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error> {
        let notification = self.repository.insert(notification).await?;
        tracing::info!(
            id = %notification.id,
            scope = %notification.scope,
            "created notification"
        );

        Ok(notification)
    }
}

#[async_trait]
impl NotificationsProducerService for NotificationsProducerServiceImpl {
    #[tracing::instrument(
        name = "Notify event status",
        skip_all,
        fields(
            event = %event.id,
            status = status.as_ref(),
        )
    )]
    async fn notify_event_status(
        &self,
        event: &EventSummary,
        status: EventStatus,
    ) -> Result<Notification, Error> {
        if event.title.trim().is_empty() {
            return Err(Error::Validation("event title is blank"));
        }

        let (severity, body) = match status {
            EventStatus::Approved => (
                Severity::Success,
                format!("Your event '{}' has been approved and is now live!", event.title),
            ),
            EventStatus::Rejected => (
                Severity::Error,
                format!("Your event '{}' has been rejected.", event.title),
            ),
            EventStatus::Pending => return Err(Error::Validation("event status is pending")),
        };

        // Generated content, the event itself is already accepted
        self.insert(NewNotification {
            scope: RecipientScope::User(event.created_by.clone()),
            title: EVENT_STATUS_TITLE.to_string(),
            body,
            severity,
            related_entity: Some(RelatedEntity {
                kind: RelatedEntityKind::Event,
                id: event.id.clone(),
            }),
        })
        .await
    }

    #[tracing::instrument(name = "Send announcement", skip_all)]
    async fn send_announcement(
        &self,
        sender_role: Option<Role>,
        title: String,
        body: String,
    ) -> Result<Notification, Error> {
        require_role(sender_role, Role::Admin)?;

        self.create(NewNotification {
            scope: RecipientScope::Broadcast,
            title,
            body,
            severity: Severity::Info,
            related_entity: None,
        })
        .await
    }

    #[tracing::instrument(name = "Notify admins", skip_all)]
    async fn notify_admins(
        &self,
        title: String,
        body: String,
        related_entity: Option<RelatedEntity>,
    ) -> Result<Notification, Error> {
        self.create(NewNotification {
            scope: RecipientScope::Role(Role::Admin),
            title,
            body,
            severity: Severity::Warning,
            related_entity,
        })
        .await
    }
}
