mod notification_store_config;
mod read_state_reconciler_config;
mod session_token;

pub use notification_store_config::*;
pub use read_state_reconciler_config::*;
pub use session_token::*;
