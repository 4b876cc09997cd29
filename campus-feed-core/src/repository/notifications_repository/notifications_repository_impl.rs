use super::{
    entity::{NotificationFindEntity, NotificationInsertEntity},
    scope_snapshot_source::ScopeSnapshotSource,
    NotificationsRepository, NotificationsWatch,
};
use crate::{
    dto::{NewNotification, Notification, NotificationId, RecipientScope},
    repository::Error,
};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::{StreamExt, TryStreamExt};
use mongodb::{
    error::ErrorKind, options::IndexOptions, Collection, Database, IndexModel,
};
use snapshot_watch::{SnapshotWatch, SnapshotWatchConfig};
use std::sync::Arc;
use time::OffsetDateTime;

pub(super) const NOTIFICATIONS: &str = "notifications";
const INDEX_NAME_RECIPIENT_CREATED_AT: &str = "index_recipient_created_at";

pub struct NotificationsRepositoryImpl {
    database: Database,
    watch_config: SnapshotWatchConfig,
}

impl NotificationsRepositoryImpl {
    pub async fn new(
        database: Database,
        watch_config: SnapshotWatchConfig,
    ) -> Result<Self, mongodb::error::Error> {
        tracing::debug!("fetching collection names");
        let collection_names = database.list_collection_names().await?;
        if !collection_names.contains(&NOTIFICATIONS.to_string()) {
            tracing::debug!(collection = NOTIFICATIONS, "creating collection");
            database.create_collection(NOTIFICATIONS).await?;
        }

        let collection = database.collection::<Document>(NOTIFICATIONS);

        tracing::debug!("fetching index names");
        let index_names = collection.list_index_names().await?;

        if !index_names.contains(&INDEX_NAME_RECIPIENT_CREATED_AT.to_string()) {
            Self::create_recipient_created_at_index(&collection).await?;
            tracing::debug!("created index {NOTIFICATIONS}.{INDEX_NAME_RECIPIENT_CREATED_AT}");
        }

        Ok(Self {
            database,
            watch_config,
        })
    }

    async fn create_recipient_created_at_index(
        collection: &Collection<Document>,
    ) -> Result<(), mongodb::error::Error> {
        let index = IndexModel::builder()
            .keys(doc! {
                "recipient": 1,
                "created_at": -1,
            })
            .options(
                IndexOptions::builder()
                    .name(INDEX_NAME_RECIPIENT_CREATED_AT.to_string())
                    .build(),
            )
            .build();

        collection.create_index(index).await?;

        Ok(())
    }
}

///
/// Finds all notifications whose recipient field equals scope_value
///
pub(super) async fn find_by_scope_value(
    database: &Database,
    scope_value: &str,
) -> Result<Vec<Notification>, mongodb::error::Error> {
    let documents = database
        .collection::<Document>(NOTIFICATIONS)
        .find(doc! { "recipient": scope_value })
        .await?
        .try_collect::<Vec<_>>()
        .await?;

    Ok(decode_notifications(documents))
}

///
/// Decodes documents one by one. Malformed documents are skipped,
/// so they don't hide the rest of the result set.
///
fn decode_notifications(documents: Vec<Document>) -> Vec<Notification> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get("_id").cloned();
            match bson::from_document::<NotificationFindEntity>(document) {
                Ok(entity) => Some(Notification::from(entity)),
                Err(err) => {
                    tracing::warn!(?id, %err, "skipping malformed notification");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl NotificationsRepository for NotificationsRepositoryImpl {
    async fn query_by_scope(&self, scope: &RecipientScope) -> Result<Vec<Notification>, Error> {
        let notifications = find_by_scope_value(&self.database, scope.scope_value()).await?;

        Ok(notifications)
    }

    async fn watch_by_scope(&self, scope: &RecipientScope) -> Result<NotificationsWatch, Error> {
        let source = ScopeSnapshotSource::new(self.database.clone(), scope.scope_value());
        let watch = SnapshotWatch::new(self.watch_config.clone(), source)
            .map(|snapshot| snapshot.map_err(Error::Watch))
            .boxed();

        Ok(watch)
    }

    async fn update_read(&self, id: &NotificationId, is_read: bool) -> Result<(), Error> {
        let object_id = ObjectId::parse_str(id.as_str())
            .map_err(|_| Error::InvalidId(id.as_str().to_string()))?;

        let update_result = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .update_one(
                doc! { "_id": object_id },
                doc! {
                    "$set": {
                        "is_read": is_read,
                    }
                },
            )
            .await?;

        // matched_count instead of modified_count because replacing
        // true with true doesn't count as modification
        match update_result.matched_count == 1 {
            true => Ok(()),
            false => Err(Error::NoDocumentUpdated),
        }
    }

    async fn insert(&self, notification: NewNotification) -> Result<Notification, Error> {
        let created_at = DateTime::from(OffsetDateTime::now_utc());
        let insert_entity = NotificationInsertEntity {
            recipient: notification.scope.scope_value().to_string(),
            title: notification.title,
            body: notification.body,
            severity: notification.severity,
            is_read: false,
            created_at,
            related_entity: notification.related_entity,
        };

        let insert_result = self
            .database
            .collection::<NotificationInsertEntity>(NOTIFICATIONS)
            .insert_one(&insert_entity)
            .await?;

        let Bson::ObjectId(id) = insert_result.inserted_id else {
            tracing::error!("invalid type of inserted '_id'");
            return Err(Error::Mongo(
                ErrorKind::Custom(Arc::new("invalid type of inserted '_id'")).into(),
            ));
        };

        Ok(Notification {
            id: NotificationId::new(id.to_hex()),
            scope: notification.scope,
            title: insert_entity.title,
            body: insert_entity.body,
            severity: insert_entity.severity,
            is_read: false,
            created_at: OffsetDateTime::from(created_at),
            related_entity: insert_entity.related_entity,
        })
    }
}
