//! Background refresh of the named caches.
//!
//! Each named key gets its own periodic task on the runtime's background
//! executor, fully decoupled from request handling: a slow or failing
//! upstream call never blocks a concurrent cache read. At most one
//! refresh per key is ever in flight; a scheduled tick that fires while
//! the previous refresh is still running is skipped, and a manual
//! trigger that arrives mid-refresh waits on the gate and reuses the
//! in-flight result instead of issuing a duplicate upstream call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use tokendeck_market_data::{TokenDataProvider, TokenRecord};

use crate::aggregator::Aggregator;
use crate::cache::{CacheConfig, CacheSlot, CacheStore};
use crate::errors::Result;
use crate::feeds::TokenFeed;

/// Per-source refresh driver with one in-flight gate per named key.
pub struct Refresher {
    store: Arc<CacheStore>,
    boosts_source: Arc<dyn TokenDataProvider>,
    ave_source: Arc<dyn TokenDataProvider>,
    boosts_gate: Mutex<()>,
    ave_gate: Mutex<()>,
}

impl Refresher {
    pub fn new(
        store: Arc<CacheStore>,
        boosts_source: Arc<dyn TokenDataProvider>,
        ave_source: Arc<dyn TokenDataProvider>,
    ) -> Self {
        Self {
            store,
            boosts_source,
            ave_source,
            boosts_gate: Mutex::new(()),
            ave_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Force a refresh of `token_boosts`, coalescing with any refresh
    /// already in flight. Returns the tokens now in the cache.
    pub async fn refresh_token_boosts(&self) -> Result<Vec<TokenRecord>> {
        Self::refresh_feed(
            &self.store.token_boosts,
            self.boosts_source.as_ref(),
            &self.boosts_gate,
        )
        .await
    }

    /// Force a refresh of `ave_data`, coalescing with any refresh
    /// already in flight.
    pub async fn refresh_ave_data(&self) -> Result<Vec<TokenRecord>> {
        Self::refresh_feed(&self.store.ave_data, self.ave_source.as_ref(), &self.ave_gate).await
    }

    /// Scheduled tick for `token_boosts`: skipped when a refresh is
    /// already running.
    pub(crate) async fn tick_token_boosts(&self) {
        Self::tick_feed(
            &self.store.token_boosts,
            self.boosts_source.as_ref(),
            &self.boosts_gate,
        )
        .await;
    }

    /// Scheduled tick for `ave_data`.
    pub(crate) async fn tick_ave_data(&self) {
        Self::tick_feed(&self.store.ave_data, self.ave_source.as_ref(), &self.ave_gate).await;
    }

    async fn refresh_feed(
        slot: &CacheSlot<TokenFeed>,
        source: &dyn TokenDataProvider,
        gate: &Mutex<()>,
    ) -> Result<Vec<TokenRecord>> {
        let started = Utc::now();
        let _gate = gate.lock().await;

        // A refresh that finished while we waited on the gate already
        // produced the result this caller wanted; reuse it rather than
        // issuing a duplicate upstream call.
        if let Some(entry) = slot.get() {
            if entry.fetched_at >= started {
                debug!("Coalesced concurrent refresh of '{}'", slot.key());
                return Ok(entry.payload.tokens);
            }
        }

        Self::fetch_into(slot, source).await
    }

    async fn tick_feed(slot: &CacheSlot<TokenFeed>, source: &dyn TokenDataProvider, gate: &Mutex<()>) {
        match gate.try_lock() {
            Ok(_gate) => {
                if let Err(e) = Self::fetch_into(slot, source).await {
                    warn!("Scheduled refresh of '{}' failed: {}", slot.key(), e);
                }
            }
            Err(_) => {
                debug!("Refresh of '{}' already in flight, skipping tick", slot.key());
            }
        }
    }

    /// The actual fetch-and-write. On failure the existing entry is left
    /// untouched, so stale data survives a refresh failure.
    async fn fetch_into(
        slot: &CacheSlot<TokenFeed>,
        source: &dyn TokenDataProvider,
    ) -> Result<Vec<TokenRecord>> {
        debug!("Refreshing '{}' from provider {}", slot.key(), source.id());
        let tokens = source.fetch_top_tokens().await?;
        slot.put(TokenFeed::new(tokens.clone()));
        info!("Cache '{}' updated with {} tokens", slot.key(), tokens.len());
        Ok(tokens)
    }
}

/// Spawns one long-lived periodic task per named key, each with its own
/// period. The first tick of every interval fires immediately, which
/// doubles as the startup warm-up.
pub struct RefreshScheduler {
    refresher: Arc<Refresher>,
    aggregator: Arc<Aggregator>,
    boosts_period: Duration,
    home_period: Duration,
    ave_period: Duration,
}

impl RefreshScheduler {
    pub fn new(refresher: Arc<Refresher>, aggregator: Arc<Aggregator>, config: &CacheConfig) -> Self {
        Self {
            refresher,
            aggregator,
            boosts_period: config.token_boosts_period,
            home_period: config.home_data_period,
            ave_period: config.ave_data_period,
        }
    }

    /// Spawn the three refresh loops. The returned handles can be
    /// aborted at shutdown; the tasks otherwise run forever.
    pub fn spawn(&self) -> Vec<JoinHandle<()>> {
        info!(
            "Starting refresh scheduler (boosts {}s, home {}s, ave {}s)",
            self.boosts_period.as_secs(),
            self.home_period.as_secs(),
            self.ave_period.as_secs()
        );

        let boosts = {
            let refresher = Arc::clone(&self.refresher);
            let period = self.boosts_period;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    refresher.tick_token_boosts().await;
                }
            })
        };

        let ave = {
            let refresher = Arc::clone(&self.refresher);
            let period = self.ave_period;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    refresher.tick_ave_data().await;
                }
            })
        };

        let home = {
            let refresher = Arc::clone(&self.refresher);
            let aggregator = Arc::clone(&self.aggregator);
            let period = self.home_period;
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    aggregator.tick_rebuild(&refresher).await;
                }
            })
        };

        vec![boosts, ave, home]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::test_util::MockProvider;
    use std::sync::atomic::Ordering;

    fn refresher(boosts: Arc<MockProvider>, ave: Arc<MockProvider>) -> Refresher {
        let store = Arc::new(CacheStore::new(&CacheConfig::ephemeral()));
        Refresher::new(store, boosts, ave)
    }

    #[tokio::test]
    async fn successful_refresh_writes_through() {
        let boosts = Arc::new(MockProvider::with_tokens(3));
        let ave = Arc::new(MockProvider::with_tokens(5));
        let refresher = refresher(Arc::clone(&boosts), ave);

        let tokens = refresher.refresh_token_boosts().await.unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(refresher.store().token_boosts.is_valid());
        assert_eq!(boosts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_stale_entry_untouched() {
        let boosts = Arc::new(MockProvider::with_tokens(3));
        let ave = Arc::new(MockProvider::with_tokens(0));
        let refresher = refresher(Arc::clone(&boosts), ave);

        refresher.refresh_token_boosts().await.unwrap();
        let before = refresher.store().token_boosts.get().unwrap();

        boosts.fail.store(true, Ordering::SeqCst);
        assert!(refresher.refresh_token_boosts().await.is_err());

        let after = refresher.store().token_boosts.get().unwrap();
        assert_eq!(after.fetched_at, before.fetched_at);
        assert_eq!(after.payload.count, before.payload.count);
    }

    #[tokio::test]
    async fn concurrent_triggers_coalesce_into_one_fetch() {
        let boosts = Arc::new(MockProvider::with_tokens(4).delayed(Duration::from_millis(50)));
        let ave = Arc::new(MockProvider::with_tokens(0));
        let refresher = Arc::new(refresher(Arc::clone(&boosts), ave));

        let a = {
            let r = Arc::clone(&refresher);
            tokio::spawn(async move { r.refresh_token_boosts().await })
        };
        let b = {
            let r = Arc::clone(&refresher);
            tokio::spawn(async move { r.refresh_token_boosts().await })
        };

        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);
        // One scheduled plus one manual trigger, one upstream call.
        assert_eq!(boosts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tick_skips_when_refresh_in_flight() {
        let boosts = Arc::new(MockProvider::with_tokens(2).delayed(Duration::from_millis(50)));
        let ave = Arc::new(MockProvider::with_tokens(0));
        let refresher = Arc::new(refresher(Arc::clone(&boosts), ave));

        let manual = {
            let r = Arc::clone(&refresher);
            tokio::spawn(async move { r.refresh_token_boosts().await })
        };
        // Give the manual refresh time to take the gate.
        tokio::time::sleep(Duration::from_millis(10)).await;
        refresher.tick_token_boosts().await;

        manual.await.unwrap().unwrap();
        assert_eq!(boosts.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn independent_keys_do_not_share_a_gate() {
        let boosts = Arc::new(MockProvider::with_tokens(1).delayed(Duration::from_millis(50)));
        let ave = Arc::new(MockProvider::with_tokens(2));
        let refresher = Arc::new(refresher(Arc::clone(&boosts), Arc::clone(&ave)));

        let slow = {
            let r = Arc::clone(&refresher);
            tokio::spawn(async move { r.refresh_token_boosts().await })
        };
        // The ave refresh completes while boosts is still in flight.
        refresher.refresh_ave_data().await.unwrap();
        assert_eq!(ave.calls.load(Ordering::SeqCst), 1);
        slow.await.unwrap().unwrap();
    }
}
