//! Unread counter state and the explicit update policy.

use serde::{Deserialize, Serialize};

use super::event::NotificationEvent;

/// The unread badge value for one authenticated session. Persisted as
/// `{"count": N}`; this is a presentation cache, not a system of record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCounter {
    pub count: u64,
}

impl UnreadCounter {
    pub fn new(count: u64) -> Self {
        Self { count }
    }

    /// Apply one deliberate update. Every ingestion path picks a variant;
    /// there is no implicit coercion from payload shapes.
    pub fn apply(&mut self, update: CounterUpdate) {
        match update {
            CounterUpdate::SetCount(n) => self.count = n,
            CounterUpdate::IncrementByOne => self.count += 1,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.count == 0
    }
}

/// How an incoming event changes the counter: a backend-provided absolute
/// value, or a plain increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    SetCount(u64),
    IncrementByOne,
}

impl CounterUpdate {
    /// Events carrying a `count_hint` set the counter directly; all others
    /// increment by one.
    pub fn for_event(event: &NotificationEvent) -> Self {
        match event.count_hint {
            Some(n) => CounterUpdate::SetCount(n),
            None => CounterUpdate::IncrementByOne,
        }
    }
}
