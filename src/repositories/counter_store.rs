//! File-backed durable slot for the unread counter.

use crate::models::counter::UnreadCounter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SLOT_FILE: &str = "unread_counter.json";

/// Single-slot persistent store surviving restarts. Reads degrade to the
/// zero default and writes are best effort; the store never blocks or fails
/// the caller.
#[derive(Debug, Clone)]
pub struct CounterStore {
    path: PathBuf,
}

impl CounterStore {
    /// Store rooted at `state_dir`. The directory is created on first save.
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(SLOT_FILE),
        }
    }

    /// Read the persisted counter synchronously. Absent, unreadable, or
    /// malformed slots all yield the zero default.
    pub fn load(&self) -> UnreadCounter {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return UnreadCounter::default(),
        };
        match parse_slot(&raw) {
            Some(counter) => {
                debug!(count = counter.count, "counter rehydrated");
                counter
            }
            None => {
                warn!(path = %self.path.display(), "malformed counter slot, using default");
                UnreadCounter::default()
            }
        }
    }

    /// Persist the counter. Failures are logged and swallowed.
    pub fn save(&self, counter: &UnreadCounter) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(error = %e, "counter state dir create failed");
                return;
            }
        }
        match serde_json::to_string(counter) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!(error = %e, "counter save failed");
                }
            }
            Err(e) => warn!(error = %e, "counter serialize failed"),
        }
    }

    /// Remove the slot entirely (post-acknowledgment path).
    pub fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "counter clear failed");
            }
        }
    }
}

/// Accept the canonical `{"count": N}` object, a bare number, or a full
/// event object carrying `count_hint` — older persisted shapes rehydrate
/// instead of degrading to zero.
fn parse_slot(raw: &str) -> Option<UnreadCounter> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    if let Some(n) = value.as_u64() {
        return Some(UnreadCounter::new(n));
    }
    let obj = value.as_object()?;
    if let Some(n) = obj.get("count").and_then(|v| v.as_u64()) {
        return Some(UnreadCounter::new(n));
    }
    obj.get("count_hint")
        .and_then(|v| v.as_u64())
        .map(UnreadCounter::new)
}
