//! Event ingestion and fan-out: feed, counter, persistence, toast.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::counter::{CounterUpdate, UnreadCounter};
use crate::models::event::NotificationEvent;
use crate::repositories::CounterStore;
use crate::services::toast::Toast;

/// Owns the in-memory notification feed and the unread counter, applying
/// events strictly in channel-delivery order.
pub struct Ingestor {
    store: CounterStore,
    toast: Arc<dyn Toast>,
    feed: VecDeque<NotificationEvent>,
    // Ids survive feed eviction so a late redelivery of an evicted event
    // still cannot double-count.
    seen: HashSet<String>,
    counter: UnreadCounter,
    max_feed: usize,
}

impl Ingestor {
    /// Rehydrates the counter from the store before any event arrives, so a
    /// restart shows the last known count immediately.
    pub fn new(store: CounterStore, toast: Arc<dyn Toast>, max_feed: usize) -> Self {
        let counter = store.load();
        Self {
            store,
            toast,
            feed: VecDeque::new(),
            seen: HashSet::new(),
            counter,
            max_feed,
        }
    }

    /// Apply one pushed event: prepend to the feed, update and persist the
    /// counter, toast the message. Redelivered ids are dropped before they
    /// can touch either the feed or the counter. Returns whether the event
    /// was applied.
    pub fn ingest(&mut self, event: NotificationEvent) -> bool {
        if !self.seen.insert(event.id.clone()) {
            debug!(id = %event.id, "duplicate delivery dropped");
            return false;
        }

        self.counter.apply(CounterUpdate::for_event(&event));
        self.store.save(&self.counter);
        self.toast.show(&event.message);
        info!(id = %event.id, kind = ?event.kind, count = self.counter.count, "notification ingested");

        self.feed.push_front(event);
        self.feed.truncate(self.max_feed);
        true
    }

    /// Most-recent-first snapshot of the feed.
    pub fn notifications(&self) -> Vec<NotificationEvent> {
        self.feed.iter().cloned().collect()
    }

    pub fn counter(&self) -> UnreadCounter {
        self.counter
    }

    /// Overwrite and persist the counter (badge consumers forcing a value).
    pub fn set_counter(&mut self, counter: UnreadCounter) {
        self.counter = counter;
        self.store.save(&self.counter);
    }

    /// Post-acknowledgment reset: zero the counter and drop the durable slot.
    pub fn clear_unread(&mut self) {
        self.counter = UnreadCounter::default();
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventKind;
    use chrono::Utc;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingToast {
        shown: Mutex<Vec<String>>,
    }

    impl Toast for RecordingToast {
        fn show(&self, message: &str) {
            self.shown.lock().unwrap().push(message.to_string());
        }
    }

    fn event(id: &str, count_hint: Option<u64>) -> NotificationEvent {
        NotificationEvent {
            id: id.to_string(),
            kind: EventKind::NewDeal,
            message: format!("deal {id}"),
            subject: None,
            read: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            count_hint,
        }
    }

    fn ingestor(dir: &TempDir, max_feed: usize) -> (Ingestor, Arc<RecordingToast>) {
        let toast = Arc::new(RecordingToast::default());
        let ing = Ingestor::new(CounterStore::new(dir.path()), toast.clone(), max_feed);
        (ing, toast)
    }

    #[test]
    fn feed_is_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let (mut ing, _) = ingestor(&dir, 10);
        ing.ingest(event("e1", None));
        ing.ingest(event("e2", None));
        let feed = ing.notifications();
        assert_eq!(feed[0].id, "e2");
        assert_eq!(feed[1].id, "e1");
    }

    #[test]
    fn duplicate_id_neither_inserts_nor_counts() {
        let dir = TempDir::new().unwrap();
        let (mut ing, toast) = ingestor(&dir, 10);
        assert!(ing.ingest(event("e1", None)));
        assert!(!ing.ingest(event("e1", None)));
        assert_eq!(ing.notifications().len(), 1);
        assert_eq!(ing.counter().count, 1);
        assert_eq!(toast.shown.lock().unwrap().len(), 1);
    }

    #[test]
    fn count_hint_sets_instead_of_incrementing() {
        let dir = TempDir::new().unwrap();
        let (mut ing, _) = ingestor(&dir, 10);
        ing.ingest(event("e1", None));
        ing.ingest(event("e2", Some(7)));
        assert_eq!(ing.counter().count, 7);
        ing.ingest(event("e3", None));
        assert_eq!(ing.counter().count, 8);
    }

    #[test]
    fn counter_is_persisted_on_every_mutation() {
        let dir = TempDir::new().unwrap();
        let (mut ing, _) = ingestor(&dir, 10);
        ing.ingest(event("e1", Some(3)));
        // Simulated reload: a fresh store sees the persisted value.
        assert_eq!(CounterStore::new(dir.path()).load().count, 3);
    }

    #[test]
    fn feed_is_capped_and_evicted_ids_stay_deduplicated() {
        let dir = TempDir::new().unwrap();
        let (mut ing, _) = ingestor(&dir, 2);
        ing.ingest(event("e1", None));
        ing.ingest(event("e2", None));
        ing.ingest(event("e3", None));
        let feed = ing.notifications();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].id, "e3");
        assert_eq!(feed[1].id, "e2");
        // e1 was evicted but its redelivery is still dropped.
        assert!(!ing.ingest(event("e1", None)));
        assert_eq!(ing.counter().count, 3);
    }

    #[test]
    fn clear_unread_zeroes_and_drops_slot() {
        let dir = TempDir::new().unwrap();
        let (mut ing, _) = ingestor(&dir, 10);
        ing.ingest(event("e1", Some(5)));
        ing.clear_unread();
        assert!(ing.counter().is_zero());
        assert_eq!(CounterStore::new(dir.path()).load(), UnreadCounter::default());
    }

    #[test]
    fn rehydrates_before_any_event() {
        let dir = TempDir::new().unwrap();
        CounterStore::new(dir.path()).save(&UnreadCounter::new(5));
        let (ing, _) = ingestor(&dir, 10);
        assert_eq!(ing.counter().count, 5);
    }
}
