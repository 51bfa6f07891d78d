//! Error types for the market data crate.
//!
//! [`MarketDataError`] covers every failure mode of an upstream provider
//! call. The caching layer uses [`is_transport`](MarketDataError::is_transport)
//! to decide whether a failure should degrade to the last cached value or
//! be surfaced to the caller.

use thiserror::Error;

/// Errors that can occur while fetching or normalizing provider data.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The upstream reported no match for a search or detail lookup.
    /// This is a normal negative result, not a provider failure.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider returned a non-success status or otherwise failed.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The whole payload had an unexpected shape and nothing usable
    /// could be extracted from it.
    #[error("Malformed payload from {provider}: {message}")]
    MalformedData {
        /// The provider that returned the payload
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The operation is not supported by this provider.
    #[error("Operation '{operation}' not supported by provider {provider}")]
    NotSupported {
        /// The operation that was requested
        operation: String,
        /// The provider it was requested from
        provider: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// True when the failure is transport-shaped: a timeout, connection
    /// failure, bad status, or an unusable payload. Callers holding a
    /// previously cached value should serve it stale instead of failing.
    ///
    /// `NotFound` and `NotSupported` are terminal answers about the
    /// request itself and are never masked by stale data.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            MarketDataError::Timeout { .. }
                | MarketDataError::ProviderError { .. }
                | MarketDataError::MalformedData { .. }
                | MarketDataError::Network(_)
        )
    }
}
