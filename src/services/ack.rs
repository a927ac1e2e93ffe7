//! Read-acknowledgment: mark all notifications read against the backend.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::BridgeResult;

/// Transport for the mark-all-read call. Production uses HTTP; tests inject
/// their own.
#[async_trait]
pub trait AckTransport: Send + Sync {
    /// POST to the mark-as-read endpoint with the bearer token. No request
    /// body; identity rides in the auth header. The backend treats the call
    /// as idempotent.
    async fn mark_all_read(&self, token: &str) -> BridgeResult<()>;
}

/// Bearer-authenticated HTTP transport.
pub struct HttpAckTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAckTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl AckTransport for HttpAckTransport {
    async fn mark_all_read(&self, token: &str) -> BridgeResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Outcome of one acknowledgment round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckOutcome {
    /// Backend confirmed; local and remote agree.
    Confirmed,
    /// Backend unreachable or rejected the call. Local state is cleared
    /// anyway (optimistic) and reconciles on the next successful round.
    LocalOnly { reason: String },
}

impl AckOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, AckOutcome::Confirmed)
    }
}

/// Runs the read-acknowledgment protocol. Transport failure is caught and
/// logged, never surfaced as an error: the caller clears local state on
/// either outcome.
pub struct AckClient {
    transport: Arc<dyn AckTransport>,
}

impl AckClient {
    pub fn new(transport: Arc<dyn AckTransport>) -> Self {
        Self { transport }
    }

    pub async fn acknowledge(&self, token: &str) -> AckOutcome {
        match self.transport.mark_all_read(token).await {
            Ok(()) => {
                info!("mark-as-read confirmed");
                AckOutcome::Confirmed
            }
            Err(e) => {
                warn!(error = %e, "mark-as-read failed, clearing locally");
                AckOutcome::LocalOnly {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;

    struct OkTransport;

    #[async_trait]
    impl AckTransport for OkTransport {
        async fn mark_all_read(&self, _token: &str) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct FailTransport;

    #[async_trait]
    impl AckTransport for FailTransport {
        async fn mark_all_read(&self, _token: &str) -> BridgeResult<()> {
            Err(BridgeError::Auth("backend unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn success_is_confirmed() {
        let client = AckClient::new(Arc::new(OkTransport));
        assert!(client.acknowledge("tok").await.is_confirmed());
    }

    #[tokio::test]
    async fn failure_degrades_to_local_only() {
        let client = AckClient::new(Arc::new(FailTransport));
        match client.acknowledge("tok").await {
            AckOutcome::LocalOnly { reason } => assert!(reason.contains("backend unavailable")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
