use crate::{
    auth::{is_scope_readable, Role},
    dto::{Notification, RecipientScope, UserId},
};
use std::collections::HashSet;
use strum::AsRefStr;

///
/// Independent audiences merged into one feed.
/// Order of variants is the merge priority.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Partition {
    Personal,
    Broadcast,
    RoleScoped,
}

impl Partition {
    pub const ALL: [Partition; 3] = [
        Partition::Personal,
        Partition::Broadcast,
        Partition::RoleScoped,
    ];

    pub fn scope(&self, identity: &UserId) -> RecipientScope {
        match self {
            Partition::Personal => RecipientScope::User(identity.clone()),
            Partition::Broadcast => RecipientScope::Broadcast,
            Partition::RoleScoped => RecipientScope::Role(Role::Admin),
        }
    }
}

///
/// Partitions the identity is allowed to read, in merge priority order.
/// Scope that is not readable is never queried nor watched.
///
pub fn readable_partitions(identity: &UserId, role: Option<Role>) -> Vec<(Partition, RecipientScope)> {
    Partition::ALL
        .into_iter()
        .map(|partition| (partition, partition.scope(identity)))
        .filter(|(_, scope)| is_scope_readable(identity, role, scope))
        .collect()
}

///
/// Latest full snapshot of every partition
///
#[derive(Debug, Clone, Default)]
pub struct PartitionSnapshots {
    personal: Vec<Notification>,
    broadcast: Vec<Notification>,
    role_scoped: Vec<Notification>,
}

impl PartitionSnapshots {
    pub fn set(&mut self, partition: Partition, notifications: Vec<Notification>) {
        match partition {
            Partition::Personal => self.personal = notifications,
            Partition::Broadcast => self.broadcast = notifications,
            Partition::RoleScoped => self.role_scoped = notifications,
        }
    }

    ///
    /// Deterministic merge of all partitions.
    /// First occurrence of an id in priority order wins.
    /// Result is sorted by creation time descending, ties are broken by id ascending.
    ///
    pub fn merge(&self) -> Vec<Notification> {
        let mut seen_ids = HashSet::new();

        let mut merged = [&self.personal, &self.broadcast, &self.role_scoped]
            .into_iter()
            .flatten()
            .filter(|notification| seen_ids.insert(&notification.id))
            .cloned()
            .collect::<Vec<_>>();

        merged.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        merged
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dto::{NotificationId, Severity};
    use time::{macros::datetime, OffsetDateTime};

    fn notification(id: &str, created_at: OffsetDateTime) -> Notification {
        Notification {
            id: NotificationId::new(id),
            scope: RecipientScope::Broadcast,
            title: format!("title {id}"),
            body: "not important body".to_string(),
            severity: Severity::Info,
            is_read: false,
            created_at,
            related_entity: None,
        }
    }

    fn ids(notifications: &[Notification]) -> Vec<&str> {
        notifications
            .iter()
            .map(|notification| notification.id.as_str())
            .collect()
    }

    #[test]
    fn readable_partitions_normal_user() {
        let identity = UserId::new("uid-1");

        let partitions = readable_partitions(&identity, Some(Role::Normal));

        assert_eq!(
            partitions,
            vec![
                (Partition::Personal, RecipientScope::User(identity)),
                (Partition::Broadcast, RecipientScope::Broadcast),
            ]
        );
    }

    #[test]
    fn readable_partitions_admin() {
        let identity = UserId::new("uid-1");

        let partitions = readable_partitions(&identity, Some(Role::Admin));

        assert_eq!(partitions.len(), 3);
        assert_eq!(
            partitions[2],
            (Partition::RoleScoped, RecipientScope::Role(Role::Admin))
        );
    }

    #[test]
    fn readable_partitions_reserved_identity_skips_personal() {
        let identity = UserId::new("ALL_USERS");

        let partitions = readable_partitions(&identity, None);

        assert_eq!(
            partitions,
            vec![(Partition::Broadcast, RecipientScope::Broadcast)]
        );
    }

    #[test]
    fn merge_sorted_most_recent_first() {
        let mut snapshots = PartitionSnapshots::default();
        snapshots.set(
            Partition::Personal,
            vec![
                notification("p-old", datetime!(2024-05-01 10:00 UTC)),
                notification("p-new", datetime!(2024-05-03 10:00 UTC)),
            ],
        );
        snapshots.set(
            Partition::Broadcast,
            vec![notification("b-mid", datetime!(2024-05-02 10:00 UTC))],
        );

        let merged = snapshots.merge();

        assert_eq!(ids(&merged), vec!["p-new", "b-mid", "p-old"]);
    }

    #[test]
    fn merge_equal_timestamps_ordered_by_id() {
        let created_at = datetime!(2024-05-01 10:00 UTC);
        let mut snapshots = PartitionSnapshots::default();
        snapshots.set(
            Partition::Broadcast,
            vec![notification("c", created_at), notification("a", created_at)],
        );
        snapshots.set(Partition::Personal, vec![notification("b", created_at)]);

        let merged = snapshots.merge();

        assert_eq!(ids(&merged), vec!["a", "b", "c"]);
    }

    #[test]
    fn merge_overlapping_ids_kept_once() {
        let created_at = datetime!(2024-05-01 10:00 UTC);
        let mut personal = notification("shared", created_at);
        personal.title = "personal copy".to_string();

        let mut snapshots = PartitionSnapshots::default();
        snapshots.set(Partition::Personal, vec![personal]);
        snapshots.set(
            Partition::Broadcast,
            vec![
                notification("shared", created_at),
                notification("shared", created_at),
                notification("other", created_at),
            ],
        );
        snapshots.set(Partition::RoleScoped, vec![notification("shared", created_at)]);

        let merged = snapshots.merge();

        let shared = merged
            .iter()
            .filter(|notification| notification.id.as_str() == "shared")
            .collect::<Vec<_>>();
        assert_eq!(merged.len(), 2);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].title, "personal copy");
    }

    #[test]
    fn merge_set_replaces_previous_snapshot() {
        let created_at = datetime!(2024-05-01 10:00 UTC);
        let mut snapshots = PartitionSnapshots::default();
        snapshots.set(Partition::Broadcast, vec![notification("b1", created_at)]);

        snapshots.set(Partition::Broadcast, Vec::new());

        assert!(snapshots.merge().is_empty());
    }
}
