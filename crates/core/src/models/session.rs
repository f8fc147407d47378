//! Session model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional metadata about the client a session was issued to
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub origin: Option<String>,
}

/// An authenticated client context, identified by an opaque bearer token
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub client: ClientInfo,
}

impl Session {
    pub fn new(
        user_id: Uuid,
        token: String,
        now: DateTime<Utc>,
        ttl: chrono::Duration,
        client: ClientInfo,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at: now,
            expires_at: now + ttl,
            client,
        }
    }

    /// Valid strictly before `expires_at`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// The token is a bearer secret; keep it out of logs and panic messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("token", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("client", &self.client)
            .finish()
    }
}
