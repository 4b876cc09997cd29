use super::MembershipsRepository;
use crate::{
    dto::{MembershipKind, SubjectRef, UserId},
    repository::Error,
};
use async_trait::async_trait;
use bson::{doc, Bson, Document};
use mongodb::{Collection, Database};

const TOGGLE_ATTEMPTS: u32 = 3;

///
/// Where membership of the subject kind is kept
///
struct SubjectLayout {
    collection: &'static str,
    members_field: &'static str,
    count_field: &'static str,
}

impl SubjectLayout {
    fn of(kind: MembershipKind) -> Self {
        match kind {
            MembershipKind::Interest => Self {
                collection: "events",
                members_field: "interested_user_ids",
                count_field: "interested_count",
            },
            MembershipKind::Like => Self {
                collection: "posts",
                members_field: "liked_by",
                count_field: "likes",
            },
        }
    }
}

pub struct MembershipsRepositoryImpl {
    database: Database,
}

impl MembershipsRepositoryImpl {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn collection(&self, layout: &SubjectLayout) -> Collection<Document> {
        self.database.collection::<Document>(layout.collection)
    }

    async fn add_member(
        &self,
        layout: &SubjectLayout,
        subject_id: &str,
        actor: &UserId,
    ) -> Result<bool, Error> {
        let mut filter = doc! { "_id": subject_id };
        filter.insert(layout.members_field, doc! { "$ne": actor.as_str() });

        let mut add_to_set = Document::new();
        add_to_set.insert(layout.members_field, actor.as_str());
        let mut inc = Document::new();
        inc.insert(layout.count_field, 1);

        let update_result = self
            .collection(layout)
            .update_one(filter, doc! { "$addToSet": add_to_set, "$inc": inc })
            .await?;

        Ok(update_result.matched_count == 1)
    }

    async fn remove_member(
        &self,
        layout: &SubjectLayout,
        subject_id: &str,
        actor: &UserId,
    ) -> Result<bool, Error> {
        let mut filter = doc! { "_id": subject_id };
        filter.insert(layout.members_field, actor.as_str());

        let mut pull = Document::new();
        pull.insert(layout.members_field, actor.as_str());
        let mut inc = Document::new();
        inc.insert(layout.count_field, -1);

        let update_result = self
            .collection(layout)
            .update_one(filter, doc! { "$pull": pull, "$inc": inc })
            .await?;

        Ok(update_result.matched_count == 1)
    }

    async fn subject_exists(&self, layout: &SubjectLayout, subject_id: &str) -> Result<bool, Error> {
        let count = self
            .collection(layout)
            .count_documents(doc! { "_id": subject_id })
            .await?;

        Ok(count > 0)
    }
}

#[async_trait]
impl MembershipsRepository for MembershipsRepositoryImpl {
    #[tracing::instrument(
        name = "Toggle membership",
        skip_all,
        fields(
            kind = subject.kind.as_ref(),
            subject = %subject.id,
            %actor,
        )
    )]
    async fn toggle_membership(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error> {
        let layout = SubjectLayout::of(subject.kind);

        // Each write only matches when membership is in the expected state,
        // so a concurrent toggle makes it miss and the other write is tried
        for attempt in 1..=TOGGLE_ATTEMPTS {
            if self.add_member(&layout, &subject.id, actor).await? {
                tracing::debug!(attempt, "member added");
                return Ok(true);
            }
            if self.remove_member(&layout, &subject.id, actor).await? {
                tracing::debug!(attempt, "member removed");
                return Ok(false);
            }
            if !self.subject_exists(&layout, &subject.id).await? {
                return Err(Error::NoDocumentFound);
            }
            tracing::debug!(attempt, "membership changed concurrently");
        }

        Err(Error::NoDocumentUpdated)
    }

    async fn is_member(&self, subject: &SubjectRef, actor: &UserId) -> Result<bool, Error> {
        let layout = SubjectLayout::of(subject.kind);

        let mut filter = doc! { "_id": subject.id.as_str() };
        filter.insert(layout.members_field, actor.as_str());

        let count = self.collection(&layout).count_documents(filter).await?;

        Ok(count > 0)
    }

    async fn get_count(&self, subject: &SubjectRef) -> Result<u64, Error> {
        let layout = SubjectLayout::of(subject.kind);

        let mut projection = Document::new();
        projection.insert(layout.count_field, 1);

        let document = self
            .collection(&layout)
            .find_one(doc! { "_id": subject.id.as_str() })
            .projection(projection)
            .await?
            .ok_or(Error::NoDocumentFound)?;

        // Missing count means nobody joined yet
        let count = match document.get(layout.count_field) {
            Some(Bson::Int32(count)) => *count as i64,
            Some(Bson::Int64(count)) => *count,
            Some(Bson::Double(count)) => *count as i64,
            _ => 0,
        };

        Ok(count.max(0) as u64)
    }
}
