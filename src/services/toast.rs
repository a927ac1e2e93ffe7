//! Ephemeral user-facing notices. Display failure is never fatal.

/// Fire-and-forget toast sink for incoming notification messages.
pub trait Toast: Send + Sync {
    fn show(&self, message: &str);
}

/// Default sink: emit the toast as a structured log event.
#[derive(Debug, Default)]
pub struct TracingToast;

impl Toast for TracingToast {
    fn show(&self, message: &str) {
        tracing::info!(toast = %message, "notification");
    }
}
