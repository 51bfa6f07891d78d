//! The keyed cache store: one typed slot per named key.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use super::slot::{CacheSlot, SlotStatus};
use super::NamedKey;
use crate::feeds::{HomeFeed, TokenFeed};

/// Cache tuning knobs. The defaults reproduce the production constants:
/// TTLs of 15/20/30 minutes for boosts/home/ave, refresh periods equal to
/// the TTLs, and a 15 minute TTL for parameterized query caches.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Directory for per-key snapshot files. `None` disables persistence.
    pub snapshot_dir: Option<PathBuf>,
    pub token_boosts_ttl: Duration,
    pub home_data_ttl: Duration,
    pub ave_data_ttl: Duration,
    /// Background refresh period per named key.
    pub token_boosts_period: Duration,
    pub home_data_period: Duration,
    pub ave_data_period: Duration,
    /// TTL shared by all dynamic-key query caches.
    pub query_ttl: Duration,
    /// Maximum entries per query cache before eviction kicks in.
    pub query_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: Some(PathBuf::from("cache")),
            token_boosts_ttl: Duration::from_secs(900),
            home_data_ttl: Duration::from_secs(1200),
            ave_data_ttl: Duration::from_secs(1800),
            token_boosts_period: Duration::from_secs(900),
            home_data_period: Duration::from_secs(1200),
            ave_data_period: Duration::from_secs(1800),
            query_ttl: Duration::from_secs(900),
            query_capacity: 256,
        }
    }
}

impl CacheConfig {
    /// In-memory-only config used by tests.
    pub fn ephemeral() -> Self {
        Self {
            snapshot_dir: None,
            ..Self::default()
        }
    }
}

/// Per-key health report, shaped for status endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct CacheHealth {
    pub timestamp: DateTime<Utc>,
    pub token_boosts: SlotStatus,
    pub home_data: SlotStatus,
    pub ave_data: SlotStatus,
}

/// Owner of every named cache entry.
///
/// Constructed once at startup and shared by `Arc`; the refresh scheduler
/// and request handlers all write through the same slots. There is no
/// ambient singleton.
pub struct CacheStore {
    pub token_boosts: CacheSlot<TokenFeed>,
    pub ave_data: CacheSlot<TokenFeed>,
    pub home_data: CacheSlot<HomeFeed>,
}

impl CacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        if let Some(dir) = &config.snapshot_dir {
            if let Err(e) = fs::create_dir_all(dir) {
                // Slots degrade to memory-only writes; persist errors are
                // logged per write.
                warn!("Failed to create snapshot dir {:?}: {}", dir, e);
            }
        }
        let dir = config.snapshot_dir.as_deref();

        Self {
            token_boosts: CacheSlot::new(NamedKey::TokenBoosts, config.token_boosts_ttl, dir),
            ave_data: CacheSlot::new(NamedKey::AveData, config.ave_data_ttl, dir),
            home_data: CacheSlot::new(NamedKey::HomeData, config.home_data_ttl, dir),
        }
    }

    /// Startup pass: populate every named slot from its disk snapshot.
    pub fn load_snapshots(&self) {
        self.token_boosts.load_snapshot();
        self.ave_data.load_snapshot();
        self.home_data.load_snapshot();
        info!("Cache snapshots loaded");
    }

    /// Explicit manual invalidation of one named key.
    pub fn invalidate(&self, key: NamedKey) {
        match key {
            NamedKey::TokenBoosts => self.token_boosts.invalidate(),
            NamedKey::AveData => self.ave_data.invalidate(),
            NamedKey::HomeData => self.home_data.invalidate(),
        }
        info!("Cache '{}' invalidated", key);
    }

    /// Validity, age, time-to-expiry and data presence per named key.
    pub fn health(&self) -> CacheHealth {
        CacheHealth {
            timestamp: Utc::now(),
            token_boosts: self.token_boosts.status(),
            home_data: self.home_data.status(),
            ave_data: self.ave_data.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::TokenFeed;
    use tokendeck_market_data::TokenRecord;

    fn feed(n: usize) -> TokenFeed {
        let tokens = (0..n)
            .map(|i| TokenRecord::new(format!("T{}", i), format!("T{}", i), format!("0x{}", i), "bsc"))
            .collect();
        TokenFeed::new(tokens)
    }

    #[test]
    fn health_covers_every_named_key() {
        let store = CacheStore::new(&CacheConfig::ephemeral());
        store.token_boosts.put(feed(3));

        let health = store.health();
        assert!(health.token_boosts.valid);
        assert_eq!(health.token_boosts.token_count, 3);
        assert!(!health.home_data.has_data);
        assert!(!health.ave_data.has_data);
    }

    #[test]
    fn invalidate_targets_one_key() {
        let store = CacheStore::new(&CacheConfig::ephemeral());
        store.token_boosts.put(feed(2));
        store.ave_data.put(feed(4));

        store.invalidate(NamedKey::TokenBoosts);
        assert!(store.token_boosts.get().is_none());
        assert!(store.ave_data.is_valid());
    }

    #[test]
    fn store_restart_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = CacheConfig {
            snapshot_dir: Some(dir.path().to_path_buf()),
            ..CacheConfig::default()
        };

        let store = CacheStore::new(&config);
        store.token_boosts.put(feed(7));
        store.ave_data.put(feed(2));
        drop(store);

        let restarted = CacheStore::new(&config);
        restarted.load_snapshots();
        assert_eq!(restarted.token_boosts.get().unwrap().payload.count, 7);
        assert_eq!(restarted.ave_data.get().unwrap().payload.count, 2);
        assert!(restarted.home_data.get().is_none());
    }
}
