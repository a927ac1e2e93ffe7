//! Bridge logic: channel lifecycle, ingestion, acknowledgment, toasts.

pub mod ack;
pub mod channel;
pub mod ingest;
pub mod toast;

pub use ack::{AckClient, AckOutcome, AckTransport, HttpAckTransport};
pub use channel::{ChannelManager, ChannelSession};
pub use ingest::Ingestor;
pub use toast::{Toast, TracingToast};
