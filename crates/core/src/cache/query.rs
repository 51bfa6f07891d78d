//! Parameterized query cache for detail/kline/trade/search lookups.
//!
//! Unlike the named slots, keys here are derived from request parameters
//! and created lazily, entries are never persisted to disk, and there is
//! no stale-fallback tier: once an entry expires, a failed recompute is
//! an error, not a degrade-to-stale. Growth is bounded by a capacity cap
//! so sustained unique-parameter load cannot leak memory.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use log::{debug, warn};

use super::entry::Entry;
use crate::errors::Result;

/// TTL map from a normalized dynamic key to a cached result.
pub struct QueryCache<T> {
    entries: RwLock<HashMap<String, Entry<T>>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> QueryCache<T> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Return the cached value while it is still fresh.
    pub fn get(&self, key: &str) -> Option<T> {
        self.read_entries()
            .get(key)
            .filter(|entry| entry.is_fresh(self.ttl))
            .map(|entry| entry.payload.clone())
    }

    /// Store a freshly computed value, evicting if at capacity: expired
    /// entries go first, then the oldest by fetch time.
    pub fn insert(&self, key: String, value: T) {
        let mut entries = self.write_entries();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.is_fresh(ttl));

            while entries.len() >= self.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.fetched_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        debug!("Query cache at capacity, evicting '{}'", k);
                        entries.remove(&k);
                    }
                    None => break,
                }
            }
        }

        entries.insert(key, Entry::new(value));
    }

    /// Valid hit returns the cached result unchanged; miss or expiry runs
    /// `compute`, stores its result under `key`, and returns it. Compute
    /// failures propagate and nothing is stored.
    pub async fn get_or_compute<F, Fut>(&self, key: &str, compute: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.get(key) {
            debug!("Query cache hit for '{}'", key);
            return Ok(hit);
        }

        let value = compute().await?;
        self.insert(key.to_string(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Query cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Query cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

// Dynamic key builders. Keys are deterministic functions of the
// normalized request parameters.

pub fn detail_key(chain: &str, address: &str) -> String {
    format!("token_details_{}_{}", chain, address)
}

pub fn kline_key(chain: &str, address: &str, interval: &str) -> String {
    format!("token_kline_{}_{}_{}", chain, address, interval)
}

pub fn trades_key(chain: &str, address: &str, limit: usize) -> String {
    format!("token_transactions_{}_{}_{}", chain, address, limit)
}

pub fn search_key(keyword: &str, chain: Option<&str>) -> String {
    format!(
        "search_tokens_{}_{}",
        keyword.to_lowercase(),
        chain.unwrap_or("all")
    )
}
