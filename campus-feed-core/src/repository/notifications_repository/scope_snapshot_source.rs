use super::notifications_repository_impl::{find_by_scope_value, NOTIFICATIONS};
use crate::dto::Notification;
use async_trait::async_trait;
use bson::{doc, Document};
use futures::StreamExt;
use mongodb::{options::FullDocumentType, Database};
use snapshot_watch::{ChangeStream, SnapshotSource};

///
/// Notifications of one scope watched through MongoDB change stream
///
pub struct ScopeSnapshotSource {
    database: Database,
    scope_value: String,
}

impl ScopeSnapshotSource {
    pub fn new(database: Database, scope_value: &str) -> Self {
        Self {
            database,
            scope_value: scope_value.to_string(),
        }
    }
}

#[async_trait]
impl SnapshotSource for ScopeSnapshotSource {
    type Item = Notification;

    async fn snapshot(&self) -> anyhow::Result<Vec<Notification>> {
        let notifications = find_by_scope_value(&self.database, &self.scope_value).await?;

        Ok(notifications)
    }

    async fn changes(&self) -> anyhow::Result<ChangeStream> {
        // Deleted documents have no fullDocument,
        // so every delete triggers a snapshot of the scope
        let pipeline = [doc! {
            "$match": {
                "$or": [
                    { "fullDocument.recipient": self.scope_value.as_str() },
                    { "operationType": "delete" },
                ]
            }
        }];

        let change_stream = self
            .database
            .collection::<Document>(NOTIFICATIONS)
            .watch()
            .pipeline(pipeline)
            .full_document(FullDocumentType::UpdateLookup)
            .await?;

        let changes = change_stream
            .map(|event| event.map(|_| ()).map_err(anyhow::Error::from))
            .boxed();

        Ok(changes)
    }
}
