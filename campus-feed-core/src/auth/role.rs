//!
//! All roles a campus user can hold
//!

use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Normal,
    Verified,
    Admin,
}

impl Role {
    ///
    /// Value kept in the recipient field of notifications scoped to the role
    ///
    pub fn scope_marker(&self) -> &'static str {
        match self {
            Role::Normal => "NORMAL",
            Role::Verified => "VERIFIED",
            Role::Admin => "ADMIN",
        }
    }

    pub fn from_scope_marker(marker: &str) -> Option<Self> {
        match marker {
            "NORMAL" => Some(Role::Normal),
            "VERIFIED" => Some(Role::Verified),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}
