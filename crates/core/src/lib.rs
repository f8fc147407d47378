//! Ledger Core Library
//!
//! Accounts, sessions, the read cache and SQLite storage for the Ledger
//! personal-finance app.

pub mod auth;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod storage;

pub use auth::{spawn_session_sweeper, AuthEvent, PasswordPolicy, SessionManager};
pub use cache::{CacheKey, CacheStore, Namespace};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use models::*;
pub use storage::{Database, Storage};

#[cfg(any(test, feature = "testing"))]
pub use clock::ManualClock;
