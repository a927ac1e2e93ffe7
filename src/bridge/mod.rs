//! Consumer surface: one shared bridge wiring the channel, feed, counter,
//! and the read-acknowledgment flow.
//!
//! Lifecycle is explicit. `set_identity(Some(..))` opens the channel,
//! `set_identity(None)` is logout and tears it down; there are no
//! import-side-effect singletons. Consumers hold a [`BridgeHandle`] and read
//! the feed and counter through it.

use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;
use crate::error::BridgeResult;
use crate::models::counter::UnreadCounter;
use crate::models::event::NotificationEvent;
use crate::models::session::{ChannelState, Identity};
use crate::repositories::CounterStore;
use crate::services::ack::{AckClient, AckOutcome, AckTransport, HttpAckTransport};
use crate::services::channel::ChannelManager;
use crate::services::ingest::Ingestor;
use crate::services::toast::{Toast, TracingToast};

struct Inner {
    manager: ChannelManager,
    ingestor: Ingestor,
    ack: AckClient,
    identity: Option<Identity>,
}

/// Owns the bridge state and the pump task that feeds channel frames into
/// ingestion. Dropping the bridge ends the lifetime of every handle.
pub struct NotificationBridge {
    inner: Arc<RwLock<Inner>>,
    pump: JoinHandle<()>,
}

impl NotificationBridge {
    /// Production wiring: file-backed store, tracing toasts, HTTP ack.
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config,
            CounterStore::new(&config.state_dir),
            Arc::new(TracingToast),
            Arc::new(HttpAckTransport::new(config.mark_read_url.clone())),
        )
    }

    /// Seam for tests and embedders: inject store, toast sink, and ack
    /// transport.
    pub fn with_parts(
        config: &Config,
        store: CounterStore,
        toast: Arc<dyn Toast>,
        transport: Arc<dyn AckTransport>,
    ) -> Self {
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let inner = Arc::new(RwLock::new(Inner {
            manager: ChannelManager::new(config.push_url.clone(), config.auth_transport, events_tx),
            ingestor: Ingestor::new(store, toast, config.max_feed),
            ack: AckClient::new(transport),
            identity: None,
        }));

        let pump_inner = Arc::downgrade(&inner);
        let pump = tokio::spawn(async move {
            while let Some(frame) = events_rx.recv().await {
                let Some(inner) = pump_inner.upgrade() else {
                    break;
                };
                match frame.notification() {
                    Some(event) => {
                        inner.write().await.ingestor.ingest(event);
                    }
                    None => debug!(event = %frame.event, "non-notification frame ignored"),
                }
            }
        });

        Self { inner, pump }
    }

    /// Accessor handed to consumers (badge, notification list).
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// React to the auth collaborator: `Some` opens the channel (closing an
    /// existing one if the identity changed), `None` is logout and tears
    /// down. Events already delivered before teardown stay applied; nothing
    /// arriving afterwards is processed.
    pub async fn set_identity(&self, identity: Option<Identity>) -> BridgeResult<()> {
        let mut guard = self.inner.write().await;
        match identity {
            Some(id) => {
                guard.manager.ensure_open(&id).await?;
                guard.identity = Some(id);
            }
            None => {
                guard.manager.close();
                guard.identity = None;
            }
        }
        Ok(())
    }
}

impl Drop for NotificationBridge {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

/// Cheap cloneable accessor for presentation consumers.
///
/// Using a handle after its `NotificationBridge` has been dropped panics
/// with a descriptive message: that is a wiring bug in the embedder, not an
/// environmental failure, and it must surface early instead of serving
/// stale data.
#[derive(Clone)]
pub struct BridgeHandle {
    inner: Weak<RwLock<Inner>>,
}

impl BridgeHandle {
    fn inner(&self) -> Arc<RwLock<Inner>> {
        self.inner.upgrade().unwrap_or_else(|| {
            panic!("BridgeHandle used outside the lifetime of its NotificationBridge")
        })
    }

    pub async fn channel_state(&self) -> ChannelState {
        self.inner().read().await.manager.state()
    }

    /// Live session id, or `None` when no channel is open.
    pub async fn session_id(&self) -> Option<String> {
        self.inner()
            .read()
            .await
            .manager
            .session_id()
            .map(String::from)
    }

    /// Most-recent-first snapshot of the notification feed.
    pub async fn notifications(&self) -> Vec<NotificationEvent> {
        self.inner().read().await.ingestor.notifications()
    }

    pub async fn unread_count(&self) -> u64 {
        self.inner().read().await.ingestor.counter().count
    }

    /// Force the badge value (persisted immediately).
    pub async fn set_unread_count(&self, count: u64) {
        self.inner()
            .write()
            .await
            .ingestor
            .set_counter(UnreadCounter::new(count));
    }

    /// Run the read-acknowledgment protocol: call the backend, then clear
    /// the counter and the durable slot on either outcome. Idempotent.
    pub async fn mark_all_read(&self) -> AckOutcome {
        let inner = self.inner();
        let mut guard = inner.write().await;
        let token = guard
            .identity
            .as_ref()
            .map(|i| i.token.clone())
            .unwrap_or_default();
        let outcome = guard.ack.acknowledge(&token).await;
        guard.ingestor.clear_unread();
        outcome
    }
}
