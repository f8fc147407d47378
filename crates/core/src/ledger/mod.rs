//! Read-through data access for the signed-in user
//!
//! Every method takes the caller's bearer token and resolves it through the
//! [`SessionManager`] before touching data; owner ids come from the session,
//! never from arguments. Reads consult the [`CacheStore`] first and populate
//! it only after a successful load. Writes invalidate every namespace they
//! can affect before returning.

mod budgets;
mod debts;
mod profile;
mod savings;
mod settings;
mod summary;
mod transactions;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::auth::{AuthEvent, SessionManager};
use crate::cache::{CacheKey, CacheStore, Namespace};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::models::{ClientInfo, Session, User};
use crate::storage::Storage;

/// Category recorded on the expense created by a debt payment
pub const DEBT_PAYMENT_CATEGORY: &str = "debt";

/// Read-modify-write rounds before a balance update gives up with `Conflict`
const WRITE_ATTEMPTS: usize = 3;

pub struct Ledger<S> {
    auth: Arc<SessionManager<S>>,
    store: Arc<S>,
    cache: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
}

impl<S: Storage> Ledger<S> {
    /// Build the session manager and cache from `config` around `store`
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        let auth = Arc::new(SessionManager::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.auth.clone(),
        ));
        let cache = Arc::new(CacheStore::from_config(&config.cache, Arc::clone(&clock)));
        Self::from_parts(auth, store, cache, clock)
    }

    /// Assemble from already constructed collaborators
    pub fn from_parts(
        auth: Arc<SessionManager<S>>,
        store: Arc<S>,
        cache: Arc<CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            auth,
            store,
            cache,
            clock,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager<S>> {
        &self.auth
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth.subscribe()
    }

    pub fn register(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
        client: ClientInfo,
    ) -> Result<(User, Session)> {
        self.auth.register(username, password, full_name, client)
    }

    /// Sign in. The login stamp changes the profile, so its cache entry goes.
    pub fn login(&self, username: &str, password: &str, client: ClientInfo) -> Result<(User, Session)> {
        let (user, session) = self.auth.login(username, password, client)?;
        self.invalidate(user.id, &[Namespace::Profile]);
        Ok((user, session))
    }

    /// End the session and forget everything cached for its user
    #[instrument(skip_all)]
    pub fn logout(&self, token: &str) -> Result<()> {
        if let Some(user_id) = self.auth.logout(token)? {
            self.cache.invalidate_user(user_id);
        }
        Ok(())
    }

    #[instrument(skip_all)]
    pub fn logout_all(&self, token: &str) -> Result<u64> {
        let user = self.auth.require_user(token)?;
        let removed = self.auth.logout_all(token)?;
        self.cache.invalidate_user(user.id);
        Ok(removed)
    }

    /// Resolve the acting user, failing with `SessionExpired`
    fn acting_user(&self, token: &str) -> Result<Uuid> {
        Ok(self.auth.require_user(token)?.id)
    }

    /// Serve `key` from cache, or run `load` and remember its result.
    ///
    /// A failed load leaves the cache untouched. A failed `put` is logged and
    /// the loaded value is still returned.
    fn read_through<T, F>(&self, key: CacheKey, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }

        let value = load()?;
        if let Err(e) = self.cache.put(key, &value) {
            warn!(error = %e, "Could not cache read result");
        }
        Ok(value)
    }

    fn invalidate(&self, user_id: Uuid, namespaces: &[Namespace]) {
        for namespace in namespaces {
            self.cache.invalidate_namespace(*namespace, user_id);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::Database;

    pub struct TestLedger {
        pub ledger: Ledger<Database>,
        pub clock: Arc<ManualClock>,
        pub db: Arc<Database>,
    }

    impl TestLedger {
        pub fn new() -> Self {
            let db = Arc::new(Database::open_in_memory().unwrap());
            let clock = Arc::new(ManualClock::starting_now());
            let ledger = Ledger::new(db.clone(), clock.clone(), &Config::default());
            Self { ledger, clock, db }
        }

        /// Register `username` and return its token
        pub fn sign_up(&self, username: &str) -> String {
            let (_, session) = self
                .ledger
                .register(username, "Secret123!", "Test Person", ClientInfo::default())
                .unwrap();
            session.token
        }
    }
}
