//! Home-view composition.
//!
//! One builder, invoked by both the background scheduler and the
//! on-demand request path, so the two can never drift apart. The chain
//! always terminates: when every live tier is empty or failing, the
//! static fallback list wins.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::Mutex;

use tokendeck_market_data::{SampleDataProvider, TokenRecord};

use crate::cache::CacheStore;
use crate::feeds::{FeedSource, HomeFeed, TokenFeed};
use crate::refresh::Refresher;

/// Leading slice of the source list shown as "trending".
const TRENDING_LIMIT: usize = 10;
/// Highest-priced tokens shown as "popular".
const POPULAR_LIMIT: usize = 15;
/// Tail window of the source list shown as "new".
const NEW_WINDOW: usize = 20;

/// Builds the composite home view and writes it to the `home_data` slot.
pub struct Aggregator {
    store: Arc<CacheStore>,
    samples: Arc<dyn SampleDataProvider>,
    gate: Mutex<()>,
}

impl Aggregator {
    pub fn new(store: Arc<CacheStore>, samples: Arc<dyn SampleDataProvider>) -> Self {
        Self {
            store,
            samples,
            gate: Mutex::new(()),
        }
    }

    /// Rebuild the home view, coalescing with any rebuild already in
    /// flight, and write it to the `home_data` slot. Infallible: the
    /// priority chain bottoms out at the static fallback list.
    pub async fn rebuild(&self, refresher: &Refresher) -> HomeFeed {
        let started = chrono::Utc::now();
        let _gate = self.gate.lock().await;

        if let Some(entry) = self.store.home_data.get() {
            if entry.fetched_at >= started {
                debug!("Coalesced concurrent home rebuild");
                return entry.payload;
            }
        }

        self.build_and_store(refresher).await
    }

    /// Scheduled rebuild: skipped when one is already running.
    pub(crate) async fn tick_rebuild(&self, refresher: &Refresher) {
        match self.gate.try_lock() {
            Ok(_gate) => {
                self.build_and_store(refresher).await;
            }
            Err(_) => debug!("Home rebuild already in flight, skipping tick"),
        }
    }

    async fn build_and_store(&self, refresher: &Refresher) -> HomeFeed {
        let (tokens, source) = self.select_tokens(refresher).await;
        let feed = compose(tokens, source);
        self.store.home_data.put(feed.clone());
        info!(
            "Home view rebuilt from {:?} with {} tokens",
            feed.source, feed.count
        );
        feed
    }

    /// Walk the priority chain, stopping at the first tier that yields a
    /// non-empty token list.
    async fn select_tokens(&self, refresher: &Refresher) -> (Vec<TokenRecord>, FeedSource) {
        if let Some(tokens) = valid_tokens(self.store.ave_data.is_valid(), || {
            self.store.ave_data.get().map(|e| e.payload)
        }) {
            debug!("Home view using cached ave_data");
            return (tokens, FeedSource::CachedAve);
        }

        if let Some(tokens) = valid_tokens(self.store.token_boosts.is_valid(), || {
            self.store.token_boosts.get().map(|e| e.payload)
        }) {
            debug!("Home view using cached token_boosts");
            return (tokens, FeedSource::CachedBoosts);
        }

        match refresher.refresh_ave_data().await {
            Ok(tokens) if !tokens.is_empty() => {
                return (tokens, FeedSource::RefreshedAve);
            }
            Ok(_) => debug!("On-demand ave_data refresh returned no tokens"),
            Err(e) => warn!("On-demand ave_data refresh failed: {}", e),
        }

        match refresher.refresh_token_boosts().await {
            Ok(tokens) if !tokens.is_empty() => {
                return (tokens, FeedSource::RefreshedBoosts);
            }
            Ok(_) => debug!("On-demand token_boosts refresh returned no tokens"),
            Err(e) => warn!("On-demand token_boosts refresh failed: {}", e),
        }

        info!("Home view falling back to the static token list");
        (self.samples.fallback_tokens(), FeedSource::Fallback)
    }
}

fn valid_tokens(valid: bool, get: impl FnOnce() -> Option<TokenFeed>) -> Option<Vec<TokenRecord>> {
    if !valid {
        return None;
    }
    get().map(|feed| feed.tokens).filter(|t| !t.is_empty())
}

/// Segment the chosen token list into the home view.
fn compose(tokens: Vec<TokenRecord>, source: FeedSource) -> HomeFeed {
    let trending: Vec<TokenRecord> = tokens.iter().take(TRENDING_LIMIT).cloned().collect();

    // Stable sort: ties keep their original order.
    let mut popular = tokens.clone();
    popular.sort_by(|a, b| b.price_or_zero().cmp(&a.price_or_zero()));
    popular.truncate(POPULAR_LIMIT);

    let new_listings: Vec<TokenRecord> =
        tokens[tokens.len().saturating_sub(NEW_WINDOW)..].to_vec();

    HomeFeed {
        count: tokens.len(),
        trending,
        popular,
        new_listings,
        tokens,
        success: true,
        timestamp: chrono::Utc::now(),
        source,
    }
}
