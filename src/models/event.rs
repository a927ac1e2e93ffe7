//! Notification event model and wire frames for the push channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kind of server-pushed notification. The backend grows new kinds over
/// time; unknown tags are kept as `Other` instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DealStatusChange,
    NewDeal,
    #[serde(untagged)]
    Other(String),
}

/// Reference to the entity a notification is about (a deal or auction).
/// Relationship only; the entity itself lives in the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// One server-pushed occurrence. Timestamps are backend-assigned and passed
/// through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Backend-assigned, unique within one channel session.
    pub id: String,
    pub kind: EventKind,
    /// Human-readable text for display and toasts.
    pub message: String,
    #[serde(default)]
    pub subject: Option<Subject>,
    /// False at ingestion; flipped only backend-side by mark-as-read.
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When present, sets (not increments) the displayed unread counter.
    #[serde(default)]
    pub count_hint: Option<u64>,
}

/// Frame pushed by the notification service: event name plus payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushFrame {
    pub event: String,
    pub data: serde_json::Value,
}

impl PushFrame {
    /// Decode a notification-bearing frame. The payload may omit `kind`, in
    /// which case the frame's event name supplies it. Frames that are not
    /// notifications (connection acks, pongs) return `None`.
    pub fn notification(&self) -> Option<NotificationEvent> {
        let mut data = self.data.clone();
        if let Some(obj) = data.as_object_mut() {
            if !obj.contains_key("kind") {
                obj.insert(
                    "kind".to_string(),
                    serde_json::Value::String(self.event.clone()),
                );
            }
        }
        match serde_json::from_value(data) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!(event = %self.event, error = %e, "frame is not a notification");
                None
            }
        }
    }
}

/// Client-to-server messages, tagged by `event` name like the server's frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake sent immediately after connecting, binding the connection
    /// to a user identity.
    Authenticate { data: AuthenticatePayload },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatePayload {
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(event: &str, data: serde_json::Value) -> PushFrame {
        PushFrame {
            event: event.to_string(),
            data,
        }
    }

    #[test]
    fn notification_kind_from_event_name() {
        let f = frame(
            "new_deal",
            json!({
                "id": "n1",
                "message": "A new deal is live",
                "created_at": "2026-08-01T12:00:00Z",
                "updated_at": "2026-08-01T12:00:00Z"
            }),
        );
        let ev = f.notification().unwrap();
        assert_eq!(ev.kind, EventKind::NewDeal);
        assert_eq!(ev.id, "n1");
        assert!(!ev.read);
        assert_eq!(ev.count_hint, None);
    }

    #[test]
    fn notification_kind_in_payload_wins() {
        let f = frame(
            "new_deal",
            json!({
                "id": "n2",
                "kind": "deal_status_change",
                "message": "Deal closed",
                "created_at": "2026-08-01T12:00:00Z",
                "updated_at": "2026-08-01T12:00:00Z"
            }),
        );
        assert_eq!(f.notification().unwrap().kind, EventKind::DealStatusChange);
    }

    #[test]
    fn unknown_kind_is_preserved() {
        let f = frame(
            "price_drop",
            json!({
                "id": "n3",
                "message": "Price dropped",
                "created_at": "2026-08-01T12:00:00Z",
                "updated_at": "2026-08-01T12:00:00Z"
            }),
        );
        assert_eq!(
            f.notification().unwrap().kind,
            EventKind::Other("price_drop".to_string())
        );
    }

    #[test]
    fn non_notification_frame_is_none() {
        let f = frame("connection_established", json!({ "session_id": "abc" }));
        assert!(f.notification().is_none());
    }

    #[test]
    fn subject_and_count_hint_round_trip() {
        let f = frame(
            "new_deal",
            json!({
                "id": "n4",
                "message": "3 unread",
                "subject": { "id": "deal-9", "title": "Vintage watch" },
                "count_hint": 3,
                "created_at": "2026-08-01T12:00:00Z",
                "updated_at": "2026-08-01T12:00:00Z"
            }),
        );
        let ev = f.notification().unwrap();
        assert_eq!(ev.count_hint, Some(3));
        let subject = ev.subject.unwrap();
        assert_eq!(subject.id, "deal-9");
        assert_eq!(subject.title.as_deref(), Some("Vintage watch"));
        assert_eq!(subject.code, None);
    }

    #[test]
    fn authenticate_frame_shape() {
        let msg = ClientMessage::Authenticate {
            data: AuthenticatePayload {
                user_id: "user-1".to_string(),
            },
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({ "event": "authenticate", "data": { "user_id": "user-1" } })
        );
    }
}
