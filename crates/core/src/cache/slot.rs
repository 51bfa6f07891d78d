//! Named cache slots with TTL and best-effort disk snapshots.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::entry::Entry;
use super::NamedKey;

/// Payloads that can report how many tokens they carry, for the health
/// accessor.
pub trait TokenCount {
    fn token_count(&self) -> usize;
}

/// Health snapshot of one named slot.
#[derive(Clone, Debug, serde::Serialize)]
pub struct SlotStatus {
    pub valid: bool,
    pub has_data: bool,
    /// Seconds since the last write, absent when the slot is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_seconds: Option<i64>,
    /// Seconds until TTL expiry; negative once expired, absent when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    pub token_count: usize,
}

/// One long-lived cache slot: a single entry guarded by a reader-writer
/// lock, with its own TTL and its own disk snapshot file.
///
/// Reads return clones, so no caller ever holds a reference into the
/// slot across a write; a reader sees either the entry before or after a
/// `put`, never a partial state. Disk I/O always happens outside the
/// critical section.
pub struct CacheSlot<T> {
    key: NamedKey,
    ttl: Duration,
    path: Option<PathBuf>,
    inner: RwLock<Option<Entry<T>>>,
}

impl<T> CacheSlot<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    /// Create an empty slot. `snapshot_dir = None` disables persistence.
    pub fn new(key: NamedKey, ttl: Duration, snapshot_dir: Option<&Path>) -> Self {
        Self {
            key,
            ttl,
            path: snapshot_dir.map(|dir| dir.join(key.snapshot_file())),
            inner: RwLock::new(None),
        }
    }

    pub fn key(&self) -> NamedKey {
        self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Non-blocking read of the current entry; never fetches.
    pub fn get(&self) -> Option<Entry<T>> {
        self.read_inner().clone()
    }

    /// True when an entry is present and younger than the TTL.
    pub fn is_valid(&self) -> bool {
        self.read_inner()
            .as_ref()
            .map(|entry| entry.is_fresh(self.ttl))
            .unwrap_or(false)
    }

    /// Atomically replace the entry, stamping `fetched_at = now`, then
    /// persist it to the disk slot. Persistence failure is logged and
    /// never fails the write.
    pub fn put(&self, payload: T) {
        let entry = Entry::new(payload);
        *self.write_inner() = Some(entry.clone());
        // Lock released before touching the disk.
        self.persist(&entry);
    }

    /// Explicit manual invalidation, the only way an entry is deleted.
    pub fn invalidate(&self) {
        *self.write_inner() = None;
    }

    /// Populate the slot from its disk snapshot, if one exists. A
    /// missing or malformed snapshot is a cold start, not an error.
    pub fn load_snapshot(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(_) => {
                debug!("No snapshot for '{}', starting cold", self.key);
                return;
            }
        };

        match serde_json::from_slice::<Entry<T>>(&bytes) {
            Ok(entry) => {
                info!(
                    "Loaded '{}' snapshot from disk, fetched at {}",
                    self.key, entry.fetched_at
                );
                *self.write_inner() = Some(entry);
            }
            Err(e) => {
                warn!(
                    "Malformed snapshot for '{}' ({}), starting cold",
                    self.key, e
                );
            }
        }
    }

    fn persist(&self, entry: &Entry<T>) {
        let Some(path) = &self.path else {
            return;
        };

        let bytes = match serde_json::to_vec(entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to serialize '{}' snapshot: {}", self.key, e);
                return;
            }
        };
        if let Err(e) = fs::write(path, bytes) {
            error!("Failed to write '{}' snapshot: {}", self.key, e);
        } else {
            debug!("Saved '{}' snapshot to disk", self.key);
        }
    }

    /// Backdate support for tests: write an entry with an explicit
    /// timestamp, skipping persistence.
    #[cfg(test)]
    pub(crate) fn put_at(&self, payload: T, fetched_at: chrono::DateTime<chrono::Utc>) {
        *self.write_inner() = Some(Entry::with_timestamp(payload, fetched_at));
    }

    fn read_inner(&self) -> RwLockReadGuard<'_, Option<Entry<T>>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Cache slot '{}' lock was poisoned, recovering", self.key);
            poisoned.into_inner()
        })
    }

    fn write_inner(&self) -> RwLockWriteGuard<'_, Option<Entry<T>>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Cache slot '{}' lock was poisoned, recovering", self.key);
            poisoned.into_inner()
        })
    }
}

impl<T> CacheSlot<T>
where
    T: Clone + Serialize + DeserializeOwned + TokenCount,
{
    /// Health view of this slot for status endpoints.
    pub fn status(&self) -> SlotStatus {
        match self.get() {
            Some(entry) => {
                let age = entry.age().as_secs() as i64;
                SlotStatus {
                    valid: entry.is_fresh(self.ttl),
                    has_data: true,
                    age_seconds: Some(age),
                    expires_in: Some(self.ttl.as_secs() as i64 - age),
                    token_count: entry.payload.token_count(),
                }
            }
            None => SlotStatus {
                valid: false,
                has_data: false,
                age_seconds: None,
                expires_in: None,
                token_count: 0,
            },
        }
    }
}
