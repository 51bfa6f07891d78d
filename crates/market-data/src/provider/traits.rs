//! Provider trait definitions.
//!
//! [`TokenDataProvider`] is the seam between the caching layer and each
//! upstream API: one implementation per upstream, each normalizing its own
//! schema into the canonical models.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{KlineSeries, SearchHit, TokenDetail, TokenRecord, TradePage};

/// Trait for upstream token data providers.
///
/// Implement this to add a new upstream. Every method enforces a hard
/// request timeout and returns an error on a non-success status or an
/// unusable payload; a single malformed record inside an otherwise valid
/// batch is skipped, not fatal.
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// A constant string like "DEXSCREENER" or "AVE", used for logging
    /// and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the provider's top/ranked token listing, normalized into
    /// [`TokenRecord`]s. The list order is meaningful and must be the
    /// upstream's own ranking order.
    async fn fetch_top_tokens(&self) -> Result<Vec<TokenRecord>, MarketDataError>;

    /// Search tokens by keyword, optionally restricted to one chain.
    ///
    /// A query that matches nothing returns `NotFound`, which callers
    /// treat as an empty result rather than a failure.
    /// Default implementation returns `NotSupported`.
    async fn search_tokens(
        &self,
        keyword: &str,
        chain: Option<&str>,
    ) -> Result<Vec<SearchHit>, MarketDataError> {
        let _ = (keyword, chain);
        Err(MarketDataError::NotSupported {
            operation: "search".to_string(),
            provider: self.id().to_string(),
        })
    }

    /// Fetch the detail view for one token by contract address and chain.
    ///
    /// Default implementation returns `NotSupported`.
    async fn token_detail(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<TokenDetail, MarketDataError> {
        let _ = (address, chain);
        Err(MarketDataError::NotSupported {
            operation: "detail".to_string(),
            provider: self.id().to_string(),
        })
    }
}

/// Static/sample data collaborator.
///
/// Supplies the fixed fallback token list used when every live source is
/// down, plus sample kline and trade data for lookups that have no live
/// upstream wired in yet. Kept behind a trait so the caching engine never
/// depends on how placeholder data is produced.
pub trait SampleDataProvider: Send + Sync {
    /// The fixed reference token list served when all live sources fail.
    fn fallback_tokens(&self) -> Vec<TokenRecord>;

    /// A synthetic kline series for the given token parameters.
    fn kline(&self, chain: &str, interval: &str) -> KlineSeries;

    /// A sample trade tape, truncated to `limit` rows.
    fn trades(&self, chain: &str, limit: usize) -> TradePage;
}
