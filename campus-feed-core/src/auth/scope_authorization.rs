use super::Role;
use crate::{
    dto::{RecipientScope, UserId},
    error::Error,
};

///
/// Decides whether identity is allowed to read notifications of the scope.
/// It's evaluated before any scoped query is constructed.
///
pub fn is_scope_readable(identity: &UserId, role: Option<Role>, scope: &RecipientScope) -> bool {
    match scope {
        RecipientScope::User(user_id) => user_id == identity && !identity.is_reserved(),
        RecipientScope::Broadcast => true,
        RecipientScope::Role(required_role) => role == Some(*required_role),
    }
}

///
/// Validates that user has required role.
///
/// ### Errors
/// - [Error::MissingRole] when role is missing
///
pub fn require_role(role: Option<Role>, required_role: Role) -> Result<(), Error> {
    match role == Some(required_role) {
        true => Ok(()),
        false => Err(Error::MissingRole(required_role)),
    }
}
