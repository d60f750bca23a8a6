//! Process-local idempotency cache.
//!
//! Entries expire against an injected [`Clock`], so tests can move time
//! forward without sleeping. Only one process sees the map; use the Redis
//! adapter when more than one gate instance runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CacheLookup, ConditionalWrite, IdempotencyCache, IdempotencyCacheError, namespaced_key,
};

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory [`IdempotencyCache`] with per-entry TTL.
///
/// `set_if_not_exists` checks and writes under one lock, so concurrent
/// callers in the same process cannot both claim a key.
pub struct InMemoryIdempotencyCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryIdempotencyCache {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryIdempotencyCache {
    /// Create an empty cache reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, IdempotencyCacheError> {
        self.entries
            .lock()
            .map_err(|_| IdempotencyCacheError::command("in-memory cache lock poisoned"))
    }

    fn expiry(&self, ttl: Duration) -> Result<DateTime<Utc>, IdempotencyCacheError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|err| IdempotencyCacheError::command(format!("invalid ttl: {err}")))?;
        Ok(self.clock.utc() + ttl)
    }

    /// Drop the entry under `key` if it has expired, returning whether a live
    /// entry remains.
    fn is_live(entries: &mut HashMap<String, Entry>, key: &str, now: DateTime<Utc>) -> bool {
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdempotencyCache for InMemoryIdempotencyCache {
    async fn get(
        &self,
        cache_name: &str,
        key: &str,
    ) -> Result<CacheLookup, IdempotencyCacheError> {
        let key = namespaced_key(cache_name, key);
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        if !Self::is_live(&mut entries, &key, now) {
            return Ok(CacheLookup::Miss);
        }
        Ok(entries
            .get(&key)
            .map_or(CacheLookup::Miss, |entry| CacheLookup::Hit(entry.value.clone())))
    }

    async fn set_if_not_exists(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<ConditionalWrite, IdempotencyCacheError> {
        let key = namespaced_key(cache_name, key);
        let now = self.clock.utc();
        let expires_at = self.expiry(ttl)?;
        let mut entries = self.lock()?;
        if Self::is_live(&mut entries, &key, now) {
            return Ok(ConditionalWrite::NotStored);
        }
        entries.insert(
            key,
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(ConditionalWrite::Stored)
    }

    async fn set(
        &self,
        cache_name: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), IdempotencyCacheError> {
        let expires_at = self.expiry(ttl)?;
        self.lock()?.insert(
            namespaced_key(cache_name, key),
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, cache_name: &str, key: &str) -> Result<(), IdempotencyCacheError> {
        self.lock()?.remove(&namespaced_key(cache_name, key));
        Ok(())
    }
}
