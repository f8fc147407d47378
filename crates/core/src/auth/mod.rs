//! Accounts, credentials and sessions

mod credentials;
mod manager;
mod sweeper;
mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use credentials::{
    hash_password, normalize_username, validate_full_name, verify_password, PasswordPolicy,
};
pub use manager::SessionManager;
pub use sweeper::spawn_session_sweeper;
pub use token::generate_token;

/// Change in authentication state, broadcast to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    LoggedIn { user_id: Uuid },
    LoggedOut { user_id: Uuid },
    SessionExpired { user_id: Uuid },
    PasswordChanged { user_id: Uuid },
    AccountDeleted { user_id: Uuid },
}

impl AuthEvent {
    pub fn user_id(&self) -> Uuid {
        match *self {
            AuthEvent::LoggedIn { user_id }
            | AuthEvent::LoggedOut { user_id }
            | AuthEvent::SessionExpired { user_id }
            | AuthEvent::PasswordChanged { user_id }
            | AuthEvent::AccountDeleted { user_id } => user_id,
        }
    }
}
