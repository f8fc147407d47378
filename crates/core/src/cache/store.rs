//! TTL cache store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::{CacheKey, Namespace};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::error::Result;

/// One memoized read result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub written_at: DateTime<Utc>,
}

/// Process-wide memo of read results with a single fixed TTL.
///
/// Stale entries read as misses even while still physically present;
/// [`purge_stale`](Self::purge_stale) reclaims them.
#[derive(Debug)]
pub struct CacheStore {
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl CacheStore {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config.ttl(), clock)
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.written_at < self.ttl
    }

    /// Fresh value for `key`, or `None` on a miss.
    ///
    /// An entry that no longer decodes as `T` is dropped and reported as a
    /// miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries();
        let entry = entries.get(key)?;
        if !self.is_fresh(entry, now) {
            trace!(%key, "Cache entry stale");
            return None;
        }

        match serde_json::from_value(entry.value.clone()) {
            Ok(value) => {
                trace!(%key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(%key, error = %e, "Dropping undecodable cache entry");
                entries.remove(key);
                None
            }
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn put<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<()> {
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            written_at: self.clock.now(),
        };
        trace!(%key, "Cache put");
        self.entries().insert(key, entry);
        Ok(())
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries().remove(key);
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.entries();
        debug!(count = entries.len(), "Flushing cache");
        entries.clear();
    }

    /// Drop every key of `namespace` belonging to `user_id`
    pub fn invalidate_namespace(&self, namespace: Namespace, user_id: Uuid) {
        self.entries()
            .retain(|key, _| !(key.namespace() == namespace && key.user_id() == user_id));
    }

    /// Drop everything cached for `user_id`
    pub fn invalidate_user(&self, user_id: Uuid) {
        self.entries().retain(|key, _| key.user_id() != user_id);
    }

    /// Physically remove stale entries; returns how many went
    pub fn purge_stale(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.written_at < self.ttl);
        before - entries.len()
    }

    /// Entries physically present, fresh or not
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
