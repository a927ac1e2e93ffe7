//! Data models for notifications, the unread counter, and channel sessions.

pub mod counter;
pub mod event;
pub mod session;

pub use counter::*;
pub use event::*;
pub use session::*;
