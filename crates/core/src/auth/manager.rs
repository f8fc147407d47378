//! Credential & session manager

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::credentials::{
    hash_password, normalize_username, validate_full_name, verify_against_dummy, verify_password,
};
use super::token::generate_token;
use super::AuthEvent;
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::models::{ClientInfo, Session, User};
use crate::storage::{SessionRepository, UserRepository};

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 64;

/// Owns registration, login, logout and session resolution.
///
/// Identity is never cached here: every call that needs to know who is
/// acting goes back to the session store with the bearer token.
pub struct SessionManager<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
    events: broadcast::Sender<AuthEvent>,
}

impl<S> SessionManager<S>
where
    S: UserRepository + SessionRepository,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: AuthConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            clock,
            config,
            events,
        }
    }

    /// Receive auth-state changes as they happen
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Create an account and log it in
    #[instrument(skip(self, password, full_name, client))]
    pub fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        client: ClientInfo,
    ) -> Result<(User, Session)> {
        let username = normalize_username(username)?;
        let full_name = validate_full_name(full_name)?;
        self.config.password.check(password)?;

        if self.store.find_user_by_username(&username)?.is_some() {
            return Err(Error::DuplicateUsername);
        }

        let now = self.clock.now();
        let mut user = User::new(username, full_name, hash_password(password)?, now);
        user.last_login = Some(now);
        // A concurrent registration can still win the race; the unique
        // index turns that into DuplicateUsername too.
        self.store.insert_user(&user)?;

        let session = self.issue_session(&user, client)?;
        info!(user_id = %user.id, "Registered new account");
        self.emit(AuthEvent::LoggedIn { user_id: user.id });
        Ok((user, session))
    }

    /// Verify credentials and issue a session.
    ///
    /// Unknown usernames and wrong passwords both cost one argon2
    /// verification and both return `InvalidCredentials`.
    #[instrument(skip_all)]
    pub fn login(
        &self,
        username: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<(User, Session)> {
        let account = match normalize_username(username) {
            Ok(username) => self.store.find_user_by_username(&username)?,
            Err(_) => None,
        };

        let verified = match &account {
            Some(user) => verify_password(password, &user.password_hash),
            None => verify_against_dummy(password),
        };

        let mut user = match account {
            Some(user) if verified => user,
            _ => {
                debug!("Login rejected");
                return Err(Error::InvalidCredentials);
            }
        };

        let now = self.clock.now();
        self.store.update_last_login(user.id, now)?;
        user.last_login = Some(now);

        let session = self.issue_session(&user, client)?;
        info!(user_id = %user.id, "Logged in");
        self.emit(AuthEvent::LoggedIn { user_id: user.id });
        Ok((user, session))
    }

    /// End one session, returning whose it was. Unknown tokens are ignored.
    #[instrument(skip_all)]
    pub fn logout(&self, token: &str) -> Result<Option<Uuid>> {
        let session = match self.store.find_session_by_token(token)? {
            Some(session) => session,
            None => return Ok(None),
        };
        self.store.delete_session(token)?;
        info!(user_id = %session.user_id, "Logged out");
        self.emit(AuthEvent::LoggedOut {
            user_id: session.user_id,
        });
        Ok(Some(session.user_id))
    }

    /// End every session of the user behind `token`
    #[instrument(skip_all)]
    pub fn logout_all(&self, token: &str) -> Result<u64> {
        let user = self.require_user(token)?;
        let removed = self.store.delete_user_sessions(user.id)?;
        info!(user_id = %user.id, removed, "Logged out everywhere");
        self.emit(AuthEvent::LoggedOut { user_id: user.id });
        Ok(removed)
    }

    /// The account behind a live session, or `None`.
    ///
    /// Expired sessions found here are deleted on the spot.
    #[instrument(skip_all)]
    pub fn resolve_session(&self, token: &str) -> Result<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }

        let session = match self.store.find_session_by_token(token)? {
            Some(session) => session,
            None => return Ok(None),
        };

        if !session.is_valid_at(self.clock.now()) {
            self.store.delete_session(token)?;
            debug!(user_id = %session.user_id, "Removed expired session");
            self.emit(AuthEvent::SessionExpired {
                user_id: session.user_id,
            });
            return Ok(None);
        }

        self.store.find_user_by_id(session.user_id)
    }

    /// Like [`resolve_session`](Self::resolve_session) but a missing session
    /// is an error. Gate for every privileged operation.
    pub fn require_user(&self, token: &str) -> Result<User> {
        self.resolve_session(token)?.ok_or(Error::SessionExpired)
    }

    /// Replace the password after re-verifying the current one.
    ///
    /// The write is a compare-and-set on the hash that was verified, so two
    /// concurrent changes cannot both succeed.
    #[instrument(skip(self, current_password, new_password))]
    pub fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .store
            .find_user_by_id(user_id)?
            .ok_or(Error::InvalidCredentials)?;

        if !verify_password(current_password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }
        self.config.password.check(new_password)?;

        let new_hash = hash_password(new_password)?;
        let swapped = self.store.replace_password_hash(
            user.id,
            &user.password_hash,
            &new_hash,
            self.clock.now(),
        )?;
        if !swapped {
            warn!(user_id = %user.id, "Password changed concurrently");
            return Err(Error::InvalidCredentials);
        }

        info!(user_id = %user.id, "Password changed");
        self.emit(AuthEvent::PasswordChanged { user_id: user.id });
        Ok(())
    }

    /// Delete the account behind `token` and everything it owns
    #[instrument(skip_all)]
    pub fn delete_account(&self, token: &str, password: &str) -> Result<Uuid> {
        let user = self.require_user(token)?;
        if !verify_password(password, &user.password_hash) {
            return Err(Error::InvalidCredentials);
        }

        self.store.delete_user(user.id)?;
        info!(user_id = %user.id, "Account deleted");
        self.emit(AuthEvent::AccountDeleted { user_id: user.id });
        Ok(user.id)
    }

    /// Remove every expired session
    pub fn sweep_expired(&self) -> Result<u64> {
        self.store.delete_expired_sessions(self.clock.now())
    }

    fn issue_session(&self, user: &User, client: ClientInfo) -> Result<Session> {
        let session = Session::new(
            user.id,
            generate_token(),
            self.clock.now(),
            self.config.session_ttl(),
            client,
        );
        self.store.insert_session(&session)?;
        Ok(session)
    }

    fn emit(&self, event: AuthEvent) {
        // Err only means nobody is listening
        let _ = self.events.send(event);
    }
}
