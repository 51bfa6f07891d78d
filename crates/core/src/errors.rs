//! Core error types for the tokendeck caching engine.
//!
//! Transport and persistence failures are swallowed internally wherever
//! stale data exists; only a true cold failure (no cached data of any
//! kind) surfaces an error to the caller.

use thiserror::Error;

use tokendeck_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the caching engine.
#[derive(Error, Debug)]
pub enum Error {
    /// A fetch failed and no cached data of any kind exists for the key.
    #[error("No data available for cache key '{key}': {reason}")]
    ColdCache {
        /// The named or dynamic cache key that has no data
        key: String,
        /// Why the fetch that would have filled it failed
        reason: String,
    },

    /// An upstream market data operation failed and could not be masked
    /// by cached data.
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),
}
