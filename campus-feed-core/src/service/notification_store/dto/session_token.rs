use crate::dto::UserId;

///
/// Proof that results were requested for the session that is still current.
/// Token of the previous identity is rejected by the store.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub(in crate::service) generation: u64,
    pub(in crate::service) identity: UserId,
}

impl SessionToken {
    pub fn identity(&self) -> &UserId {
        &self.identity
    }
}
