//! Shared test doubles for the cache, refresh, and service tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;

use tokendeck_market_data::{
    KlineSeries, MarketDataError, SampleDataProvider, SearchHit, StaticSampleProvider,
    TokenDataProvider, TokenDetail, TokenRecord, TradePage,
};

pub(crate) fn token_with_price(i: usize, price: Option<Decimal>) -> TokenRecord {
    let mut token = TokenRecord::new(
        format!("Token{}", i),
        format!("T{}", i),
        format!("0x{:04x}", i),
        "ethereum",
    );
    token.price = price;
    token
}

/// Scriptable upstream: a fixed token list, a failure switch, a call
/// counter, and an optional artificial latency.
pub(crate) struct MockProvider {
    pub tokens: Mutex<Vec<TokenRecord>>,
    pub search_hits: Mutex<Vec<SearchHit>>,
    pub detail: Mutex<Option<TokenDetail>>,
    pub fail: AtomicBool,
    pub calls: AtomicUsize,
    delay: Duration,
}

impl MockProvider {
    pub fn with_tokens(n: usize) -> Self {
        Self {
            tokens: Mutex::new((0..n).map(|i| token_with_price(i, None)).collect()),
            search_hits: Mutex::new(Vec::new()),
            detail: Mutex::new(None),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn outage(&self) -> MarketDataError {
        MarketDataError::ProviderError {
            provider: "MOCK".to_string(),
            message: "simulated outage".to_string(),
        }
    }
}

#[async_trait]
impl TokenDataProvider for MockProvider {
    fn id(&self) -> &'static str {
        "MOCK"
    }

    async fn fetch_top_tokens(&self) -> Result<Vec<TokenRecord>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        Ok(self.tokens.lock().unwrap().clone())
    }

    async fn search_tokens(
        &self,
        keyword: &str,
        _chain: Option<&str>,
    ) -> Result<Vec<SearchHit>, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        let hits = self.search_hits.lock().unwrap().clone();
        if hits.is_empty() {
            return Err(MarketDataError::NotFound(keyword.to_string()));
        }
        Ok(hits)
    }

    async fn token_detail(
        &self,
        address: &str,
        _chain: &str,
    ) -> Result<TokenDetail, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(self.outage());
        }
        self.detail
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| MarketDataError::NotFound(address.to_string()))
    }
}

/// Sample-data stand-in that just delegates to the real static provider.
pub(crate) struct MockSamples;

impl SampleDataProvider for MockSamples {
    fn fallback_tokens(&self) -> Vec<TokenRecord> {
        StaticSampleProvider::new().fallback_tokens()
    }

    fn kline(&self, chain: &str, interval: &str) -> KlineSeries {
        StaticSampleProvider::new().kline(chain, interval)
    }

    fn trades(&self, chain: &str, limit: usize) -> TradePage {
        StaticSampleProvider::new().trades(chain, limit)
    }
}
