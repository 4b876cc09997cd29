mod role;
mod scope_authorization;

pub use role::*;
pub use scope_authorization::*;
