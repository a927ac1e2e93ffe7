//! Channel identity and session lifecycle state.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output of the auth collaborator: who is logged in and their bearer
/// credential. The token is opaque to the bridge and may be revoked at any
/// time (logout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub token: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            token: token.into(),
        }
    }
}

/// Push channel lifecycle. There is no `Reconnecting`: a dropped connection
/// stays down until the caller opens again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Authenticated,
}

/// Generate a unique session/connection id.
pub fn generate_session_id() -> String {
    format!("{}.{}", std::process::id(), Uuid::new_v4().as_simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(generate_session_id(), generate_session_id());
    }

    #[test]
    fn identity_equality_covers_token() {
        let a = Identity::new("u1", "t1");
        let b = Identity::new("u1", "t2");
        assert_ne!(a, b);
        assert_eq!(a, Identity::new("u1", "t1"));
    }
}
