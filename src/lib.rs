//! Client-side real-time notification bridge.
//!
//! Keeps one authenticated push channel open per identity, ingests typed
//! notification events into a bounded most-recent-first feed, persists the
//! unread counter across restarts, and reconciles it with the backend
//! through an optimistic mark-as-read call.

pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use bridge::{BridgeHandle, NotificationBridge};
pub use config::{AuthTransport, Config};
pub use error::{BridgeError, BridgeResult};
pub use models::counter::{CounterUpdate, UnreadCounter};
pub use models::event::{EventKind, NotificationEvent, PushFrame};
pub use models::session::{ChannelState, Identity};
pub use repositories::CounterStore;
pub use services::ack::AckOutcome;
