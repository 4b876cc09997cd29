use super::UserId;
use strum::{AsRefStr, EnumString};

///
/// Kind of membership.
/// Interest is expressed on events, like on blog posts.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MembershipKind {
    Interest,
    Like,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectRef {
    pub kind: MembershipKind,
    pub id: String,
}

impl SubjectRef {
    pub fn event(id: impl Into<String>) -> Self {
        Self {
            kind: MembershipKind::Interest,
            id: id.into(),
        }
    }

    pub fn post(id: impl Into<String>) -> Self {
        Self {
            kind: MembershipKind::Like,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MembershipKey {
    pub subject: SubjectRef,
    pub actor: UserId,
}

impl MembershipKey {
    pub fn new(subject: SubjectRef, actor: UserId) -> Self {
        Self { subject, actor }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipState {
    pub is_member: bool,
    pub count: u64,
}

impl MembershipState {
    ///
    /// State right after the actor flips membership.
    /// Count never drops below 0.
    ///
    pub fn toggled(self) -> Self {
        match self.is_member {
            true => Self {
                is_member: false,
                count: self.count.saturating_sub(1),
            },
            false => Self {
                is_member: true,
                count: self.count + 1,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterPhase {
    Idle,
    Optimistic,
    Reconciled,
    RolledBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Server confirmed the toggle, state holds authoritative values.
    Reconciled(MembershipState),

    /// Server rejected the toggle, state holds values from before the toggle.
    RolledBack(MembershipState),

    /// Another toggle of the same key is still in flight, nothing changed.
    AlreadyInFlight(MembershipState),

    /// Key could not be seeded with the server state, nothing changed.
    Unavailable,
}
