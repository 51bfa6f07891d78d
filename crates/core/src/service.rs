//! The service facade over the caching engine.
//!
//! One object owns the named slots, the refresh driver, the home-view
//! aggregator, and the parameterized query caches, and exposes the
//! operations a transport layer would map to endpoints. Callers never
//! touch providers directly.

use std::sync::Arc;

use log::{info, warn};
use serde::Serialize;
use tokio::task::JoinHandle;

use tokendeck_market_data::{
    KlineSeries, MarketDataError, SampleDataProvider, SearchResults, TokenDataProvider,
    TokenDetail, TradePage,
};

use crate::aggregator::Aggregator;
use crate::cache::{
    detail_key, kline_key, search_key, trades_key, CacheConfig, CacheHealth, CacheSlot,
    CacheStore, NamedKey, QueryCache,
};
use crate::errors::{Error, Result};
use crate::feeds::{HomeFeed, TokenFeed};
use crate::refresh::{RefreshScheduler, Refresher};

/// A cache read plus its freshness marker. Stale responses carry the
/// reason the refresh that should have replaced them failed.
#[derive(Clone, Debug, Serialize)]
pub struct Cached<T> {
    #[serde(flatten)]
    pub data: T,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<String>,
}

impl<T> Cached<T> {
    fn fresh(data: T) -> Self {
        Self {
            data,
            stale: false,
            stale_reason: None,
        }
    }

    fn stale(data: T, reason: String) -> Self {
        Self {
            data,
            stale: true,
            stale_reason: Some(reason),
        }
    }
}

/// What a manual refresh request targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshTarget {
    TokenBoosts,
    HomeData,
    AveData,
    All,
}

impl RefreshTarget {
    fn covers(&self, key: NamedKey) -> bool {
        match self {
            RefreshTarget::All => true,
            RefreshTarget::TokenBoosts => key == NamedKey::TokenBoosts,
            RefreshTarget::HomeData => key == NamedKey::HomeData,
            RefreshTarget::AveData => key == NamedKey::AveData,
        }
    }
}

/// Per-key outcome of a manual refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    /// Keys refreshed successfully, in refresh order.
    pub refreshed: Vec<NamedKey>,
    /// Keys whose upstream fetch failed, with the failure.
    pub failed: Vec<(NamedKey, Error)>,
}

impl RefreshReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, key: NamedKey, result: Result<()>) {
        match result {
            Ok(()) => self.refreshed.push(key),
            Err(e) => {
                warn!("Manual refresh of '{}' failed: {}", key, e);
                self.failed.push((key, e));
            }
        }
    }
}

/// The caching token data service.
pub struct TokenService {
    config: CacheConfig,
    store: Arc<CacheStore>,
    refresher: Arc<Refresher>,
    aggregator: Arc<Aggregator>,
    lookup: Arc<dyn TokenDataProvider>,
    samples: Arc<dyn SampleDataProvider>,
    details: QueryCache<TokenDetail>,
    klines: QueryCache<KlineSeries>,
    trades: QueryCache<TradePage>,
    searches: QueryCache<SearchResults>,
}

impl TokenService {
    /// Wire up the engine. `boosts_source` and `ave_source` feed the
    /// named slots, `lookup` serves detail and search queries, and
    /// `samples` supplies fallback and sample data.
    pub fn new(
        config: CacheConfig,
        boosts_source: Arc<dyn TokenDataProvider>,
        ave_source: Arc<dyn TokenDataProvider>,
        lookup: Arc<dyn TokenDataProvider>,
        samples: Arc<dyn SampleDataProvider>,
    ) -> Self {
        let store = Arc::new(CacheStore::new(&config));
        let refresher = Arc::new(Refresher::new(Arc::clone(&store), boosts_source, ave_source));
        let aggregator = Arc::new(Aggregator::new(Arc::clone(&store), Arc::clone(&samples)));

        Self {
            store,
            refresher,
            aggregator,
            lookup,
            samples,
            details: QueryCache::new(config.query_ttl, config.query_capacity),
            klines: QueryCache::new(config.query_ttl, config.query_capacity),
            trades: QueryCache::new(config.query_ttl, config.query_capacity),
            searches: QueryCache::new(config.query_ttl, config.query_capacity),
            config,
        }
    }

    /// Warm the named slots from disk and start the background refresh
    /// loops. Returns the scheduler task handles for shutdown.
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.store.load_snapshots();
        let scheduler = RefreshScheduler::new(
            Arc::clone(&self.refresher),
            Arc::clone(&self.aggregator),
            &self.config,
        );
        scheduler.spawn()
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// The boosted-token feed: valid cache wins, otherwise refresh; a
    /// failed refresh degrades to the stale entry when one exists.
    pub async fn token_boosts(&self) -> Result<Cached<TokenFeed>> {
        if self.store.token_boosts.is_valid() {
            if let Some(entry) = self.store.token_boosts.get() {
                return Ok(Cached::fresh(entry.payload));
            }
        }

        match self.refresher.refresh_token_boosts().await {
            Ok(_) => read_fresh(&self.store.token_boosts),
            Err(e) => degrade(&self.store.token_boosts, e),
        }
    }

    /// The hot-ranking feed, with the same valid/refresh/stale ladder as
    /// the boosts feed.
    pub async fn ave_tokens(&self) -> Result<Cached<TokenFeed>> {
        if self.store.ave_data.is_valid() {
            if let Some(entry) = self.store.ave_data.get() {
                return Ok(Cached::fresh(entry.payload));
            }
        }

        match self.refresher.refresh_ave_data().await {
            Ok(_) => read_fresh(&self.store.ave_data),
            Err(e) => degrade(&self.store.ave_data, e),
        }
    }

    /// The composite home view. Never fails: on a cache miss the
    /// aggregator walks its priority chain down to the static fallback.
    pub async fn home(&self) -> Cached<HomeFeed> {
        if self.store.home_data.is_valid() {
            if let Some(entry) = self.store.home_data.get() {
                return Cached::fresh(entry.payload);
            }
        }

        Cached::fresh(self.aggregator.rebuild(&self.refresher).await)
    }

    /// Detail lookup for one token, cached per `(chain, address)`.
    /// An unknown token is an error here, not an empty success.
    pub async fn token_detail(&self, address: &str, chain: &str) -> Result<TokenDetail> {
        let key = detail_key(chain, address);
        self.details
            .get_or_compute(&key, || async {
                Ok(self.lookup.token_detail(address, chain).await?)
            })
            .await
    }

    /// Candle series for one token, cached per `(chain, address,
    /// interval)`. Served from the sample collaborator; there is no live
    /// kline upstream yet.
    pub async fn token_kline(
        &self,
        address: &str,
        chain: &str,
        interval: &str,
    ) -> Result<KlineSeries> {
        let key = kline_key(chain, address, interval);
        self.klines
            .get_or_compute(&key, || async { Ok(self.samples.kline(chain, interval)) })
            .await
    }

    /// Recent trades for one token, cached per `(chain, address, limit)`.
    pub async fn token_transactions(
        &self,
        address: &str,
        chain: &str,
        limit: usize,
    ) -> Result<TradePage> {
        let key = trades_key(chain, address, limit);
        self.trades
            .get_or_compute(&key, || async { Ok(self.samples.trades(chain, limit)) })
            .await
    }

    /// Keyword search, cached per normalized `(keyword, chain)`. A query
    /// that matches nothing is an empty success, not an error.
    pub async fn search_tokens(
        &self,
        keyword: &str,
        chain: Option<&str>,
    ) -> Result<SearchResults> {
        let key = search_key(keyword, chain);
        self.searches
            .get_or_compute(&key, || async {
                match self.lookup.search_tokens(keyword, chain).await {
                    Ok(hits) => Ok(SearchResults {
                        count: hits.len(),
                        tokens: hits,
                        keyword: keyword.to_string(),
                        chain: chain.unwrap_or("all").to_string(),
                    }),
                    Err(MarketDataError::NotFound(_)) => {
                        Ok(SearchResults::empty(keyword, chain))
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await
    }

    /// Manual refresh of one or all named keys, bypassing TTLs.
    /// Best-effort per key: one upstream failing never stops the other
    /// keys from refreshing.
    pub async fn force_refresh(&self, target: RefreshTarget) -> RefreshReport {
        let mut report = RefreshReport::default();

        if target.covers(NamedKey::TokenBoosts) {
            report.record(
                NamedKey::TokenBoosts,
                self.refresher.refresh_token_boosts().await.map(|_| ()),
            );
        }
        if target.covers(NamedKey::AveData) {
            report.record(
                NamedKey::AveData,
                self.refresher.refresh_ave_data().await.map(|_| ()),
            );
        }
        if target.covers(NamedKey::HomeData) {
            self.aggregator.rebuild(&self.refresher).await;
            report.record(NamedKey::HomeData, Ok(()));
        }

        info!(
            "Manual refresh completed: {:?} refreshed, {} failed",
            report.refreshed,
            report.failed.len()
        );
        report
    }

    /// Drop one named entry. The next read refetches.
    pub fn invalidate(&self, key: NamedKey) {
        self.store.invalidate(key);
    }

    /// Per-key cache health for status endpoints.
    pub fn cache_health(&self) -> CacheHealth {
        self.store.health()
    }
}

fn read_fresh(slot: &CacheSlot<TokenFeed>) -> Result<Cached<TokenFeed>> {
    match slot.get() {
        Some(entry) => Ok(Cached::fresh(entry.payload)),
        // Only reachable if an invalidate races the refresh we just ran.
        None => Err(Error::ColdCache {
            key: slot.key().to_string(),
            reason: "entry disappeared during refresh".to_string(),
        }),
    }
}

/// A refresh failed: transport-class errors degrade to the stale entry
/// when one exists, anything else (or an empty slot) surfaces.
fn degrade(slot: &CacheSlot<TokenFeed>, err: Error) -> Result<Cached<TokenFeed>> {
    let transport = matches!(&err, Error::MarketData(e) if e.is_transport());
    if !transport {
        return Err(err);
    }

    match slot.get() {
        Some(entry) => {
            warn!(
                "Refresh of '{}' failed, serving stale data: {}",
                slot.key(),
                err
            );
            Ok(Cached::stale(
                entry.payload,
                format!("refresh failed: {}", err),
            ))
        }
        None => Err(Error::ColdCache {
            key: slot.key().to_string(),
            reason: err.to_string(),
        }),
    }
}
