mod feed;
mod membership;
mod notification;

pub use feed::*;
pub use membership::*;
pub use notification::*;
