//! Push channel lifecycle: connect, authenticate handshake, teardown.

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::AuthTransport;
use crate::error::{BridgeError, BridgeResult};
use crate::models::event::{AuthenticatePayload, ClientMessage, PushFrame};
use crate::models::session::{generate_session_id, ChannelState, Identity};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One open push connection, bound to exactly one identity.
pub struct ChannelSession {
    session_id: String,
    identity: Identity,
    reader: JoinHandle<()>,
    // Keeps the connection alive for the session's lifetime; both halves
    // drop on teardown, closing the socket.
    _writer: SplitSink<WsStream, Message>,
}

impl ChannelSession {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }
}

/// Owns at most one `ChannelSession` and enforces the single-channel
/// invariant: reopening for the same identity is a no-op, an identity change
/// closes the old session first, logout tears down.
///
/// A server-side drop ends the reader task; the manager observes that and
/// reports `Disconnected`, but never retries on its own — `ensure_open` is
/// the caller's retry primitive.
pub struct ChannelManager {
    endpoint: String,
    auth_transport: AuthTransport,
    events: mpsc::UnboundedSender<PushFrame>,
    session: Option<ChannelSession>,
    state: ChannelState,
}

impl ChannelManager {
    /// Delivered frames are forwarded in arrival order to `events`.
    pub fn new(
        endpoint: String,
        auth_transport: AuthTransport,
        events: mpsc::UnboundedSender<PushFrame>,
    ) -> Self {
        Self {
            endpoint,
            auth_transport,
            events,
            session: None,
            state: ChannelState::Disconnected,
        }
    }

    /// The reader task ending (server drop, read error) counts as
    /// `Disconnected` even before the caller tears down.
    pub fn state(&self) -> ChannelState {
        if self.session.as_ref().is_some_and(|s| s.reader.is_finished()) {
            return ChannelState::Disconnected;
        }
        self.state
    }

    /// Live session id, or `None` when no channel is open or the connection
    /// has ended.
    pub fn session_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .filter(|s| !s.reader.is_finished())
            .map(|s| s.session_id())
    }

    /// Open a channel for `identity` if none is open, and return the live
    /// session id. A second call with the same identity reuses the open
    /// session; a different identity (or a rotated token) closes the old
    /// session before connecting. A session whose connection has ended is
    /// discarded and replaced.
    pub async fn ensure_open(&mut self, identity: &Identity) -> BridgeResult<String> {
        if self.session.as_ref().is_some_and(|s| s.reader.is_finished()) {
            info!("previous channel ended, reopening");
            self.close();
        }
        if let Some(session) = &self.session {
            if session.identity == *identity {
                debug!(session_id = %session.session_id, "channel already open");
                return Ok(session.session_id.clone());
            }
            info!(user_id = %identity.user_id, "identity changed, closing previous channel");
            self.close();
        }

        self.state = ChannelState::Connecting;
        let ws = match self.connect(identity).await {
            Ok(ws) => ws,
            Err(e) => {
                self.state = ChannelState::Disconnected;
                return Err(e);
            }
        };

        let session_id = generate_session_id();
        let (mut writer, mut reader) = ws.split();

        if self.auth_transport == AuthTransport::Handshake {
            let handshake = ClientMessage::Authenticate {
                data: AuthenticatePayload {
                    user_id: identity.user_id.clone(),
                },
            };
            let text = serde_json::to_string(&handshake)?;
            if let Err(e) = writer.send(Message::Text(text)).await {
                self.state = ChannelState::Disconnected;
                return Err(BridgeError::Channel(e));
            }
        }

        let events = self.events.clone();
        let reader_session = session_id.clone();
        let reader = tokio::spawn(async move {
            while let Some(msg) = reader.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<PushFrame>(&text) {
                        Ok(frame) => {
                            if events.send(frame).is_err() {
                                break;
                            }
                        }
                        Err(e) => debug!(error = %e, "unparseable frame dropped"),
                    },
                    Ok(Message::Close(_)) => {
                        info!(session_id = %reader_session, "channel closed by server");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(session_id = %reader_session, error = %e, "channel read error");
                        break;
                    }
                }
            }
        });

        info!(session_id = %session_id, user_id = %identity.user_id, "channel open");
        self.state = ChannelState::Authenticated;
        self.session = Some(ChannelSession {
            session_id: session_id.clone(),
            identity: identity.clone(),
            reader,
            _writer: writer,
        });
        Ok(session_id)
    }

    /// Tear down the open channel, if any. The reader task is aborted before
    /// the handle is cleared, so no event delivered after this call can
    /// reach the ingestion side.
    pub fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.reader.abort();
            info!(session_id = %session.session_id, "channel closed");
        }
        self.state = ChannelState::Disconnected;
    }

    async fn connect(&self, identity: &Identity) -> BridgeResult<WsStream> {
        let mut request = self.endpoint.as_str().into_client_request()?;
        if self.auth_transport == AuthTransport::Header {
            let value = HeaderValue::from_str(&format!("Bearer {}", identity.token))
                .map_err(|_| BridgeError::Auth("bearer token is not header-safe".to_string()))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        let (ws, _) = connect_async(request).await?;
        Ok(ws)
    }
}

impl Drop for ChannelManager {
    fn drop(&mut self) {
        self.close();
    }
}
