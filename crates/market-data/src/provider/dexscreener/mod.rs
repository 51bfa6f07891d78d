//! DexScreener boosted-tokens provider.
//!
//! Serves the "token boosts" listing from the DexScreener public API
//! (`/token-boosts/top/v1`). No API key required. The endpoint returns a
//! `data` array of promoted tokens with a nested `{ "price": { "usd" } }`
//! object; everything else in the payload is ignored.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{TokenRecord, DEFAULT_CHAIN, UNKNOWN};
use crate::provider::TokenDataProvider;

const BASE_URL: &str = "https://api.dexscreener.com";
const PROVIDER_ID: &str = "DEXSCREENER";

/// Hard request timeout for the boosts endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /token-boosts/top/v1.
#[derive(Debug, Deserialize)]
struct BoostsResponse {
    /// Boosted token entries. Kept as raw values so one malformed entry
    /// cannot poison the whole batch.
    data: Option<Vec<Value>>,
}

/// One boosted token entry.
#[derive(Debug, Deserialize)]
struct RawBoost {
    name: Option<String>,
    symbol: Option<String>,
    address: Option<String>,
    logo: Option<String>,
    price: Option<RawPrice>,
    chain: Option<String>,
}

/// Nested price object.
#[derive(Debug, Deserialize)]
struct RawPrice {
    usd: Option<Decimal>,
}

// ============================================================================
// DexScreenerProvider
// ============================================================================

/// DexScreener boosted-tokens provider.
///
/// Only implements the top-tokens feed; search and detail lookups are
/// not offered by this upstream.
pub struct DexScreenerProvider {
    client: Client,
    base_url: String,
}

impl DexScreenerProvider {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, base_url }
    }

    /// GET the boosts endpoint and return the raw body.
    async fn fetch_boosts_body(&self) -> Result<String, MarketDataError> {
        let url = format!("{}/token-boosts/top/v1", self.base_url);
        debug!("DexScreener request: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "*/*")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read response: {}", e),
            })
    }

    /// Normalize one raw boost entry. Returns `None` when the entry
    /// cannot be interpreted, in which case it is skipped.
    fn normalize(raw: Value) -> Option<TokenRecord> {
        let boost: RawBoost = serde_json::from_value(raw).ok()?;

        let mut token = TokenRecord::new(
            boost.name.unwrap_or_else(|| UNKNOWN.to_string()),
            boost.symbol.unwrap_or_else(|| UNKNOWN.to_string()),
            boost.address.unwrap_or_default(),
            boost.chain.unwrap_or_else(|| DEFAULT_CHAIN.to_string()),
        );
        token.logo = boost.logo;
        token.price = boost.price.and_then(|p| p.usd);
        Some(token)
    }

    /// Parse and normalize the whole payload.
    fn parse_tokens(body: &str) -> Result<Vec<TokenRecord>, MarketDataError> {
        let response: BoostsResponse =
            serde_json::from_str(body).map_err(|e| MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse boosts response: {}", e),
            })?;

        let entries = response.data.ok_or_else(|| MarketDataError::MalformedData {
            provider: PROVIDER_ID.to_string(),
            message: "missing 'data' array".to_string(),
        })?;

        let total = entries.len();
        let tokens: Vec<TokenRecord> = entries
            .into_iter()
            .filter_map(Self::normalize)
            .collect();

        // An empty `data` array is a legitimate empty listing, but a
        // populated one where nothing normalizes is an unusable payload.
        if tokens.is_empty() && total > 0 {
            return Err(MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: format!("all {} boost entries were unusable", total),
            });
        }
        if tokens.len() < total {
            warn!(
                "DexScreener: skipped {} malformed boost entries",
                total - tokens.len()
            );
        }

        Ok(tokens)
    }
}

impl Default for DexScreenerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenDataProvider for DexScreenerProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_top_tokens(&self) -> Result<Vec<TokenRecord>, MarketDataError> {
        let body = self.fetch_boosts_body().await?;
        let tokens = Self::parse_tokens(&body)?;
        debug!("DexScreener returned {} boosted tokens", tokens.len());
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn provider_id() {
        assert_eq!(DexScreenerProvider::new().id(), "DEXSCREENER");
    }

    #[test]
    fn parse_tokens_normalizes_nested_price() {
        let body = r#"{
            "data": [
                {
                    "name": "Pepe",
                    "symbol": "PEPE",
                    "address": "0xabc",
                    "logo": "https://img/pepe.png",
                    "price": { "usd": 0.0000012 },
                    "chain": "ethereum"
                }
            ]
        }"#;

        let tokens = DexScreenerProvider::parse_tokens(body).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "Pepe");
        assert_eq!(tokens[0].price, Some(dec!(0.0000012)));
        assert_eq!(tokens[0].logo.as_deref(), Some("https://img/pepe.png"));
    }

    #[test]
    fn parse_tokens_defaults_missing_fields() {
        let body = r#"{ "data": [ { "address": "0xdef" } ] }"#;

        let tokens = DexScreenerProvider::parse_tokens(body).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].name, "Unknown");
        assert_eq!(tokens[0].symbol, "Unknown");
        assert_eq!(tokens[0].chain, "ethereum");
        assert_eq!(tokens[0].price, None);
    }

    #[test]
    fn parse_tokens_skips_malformed_entries() {
        // Second entry has a price that is not an object.
        let body = r#"{
            "data": [
                { "name": "Good", "symbol": "GOOD", "address": "0x1", "chain": "bsc" },
                { "name": "Bad", "price": "not-an-object" },
                { "name": "AlsoGood", "symbol": "OK", "address": "0x2", "chain": "bsc" }
            ]
        }"#;

        let tokens = DexScreenerProvider::parse_tokens(body).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "Good");
        assert_eq!(tokens[1].name, "AlsoGood");
    }

    #[test]
    fn parse_tokens_rejects_fully_unusable_data() {
        // Every entry fails normalization: this must surface as a
        // malformed payload so callers keep their stale data, never as
        // an empty success.
        let body = r#"{ "data": [ "not-an-object", 42, { "name": "Bad", "price": "not-an-object" } ] }"#;
        let err = DexScreenerProvider::parse_tokens(body).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedData { .. }));

        // A genuinely empty listing is still an empty success.
        let tokens = DexScreenerProvider::parse_tokens(r#"{ "data": [] }"#).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn parse_tokens_rejects_payload_without_data() {
        let err = DexScreenerProvider::parse_tokens(r#"{ "ok": true }"#).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedData { .. }));

        let err = DexScreenerProvider::parse_tokens("not json").unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedData { .. }));
    }

    #[tokio::test]
    async fn search_is_not_supported() {
        let provider = DexScreenerProvider::new();
        let err = provider.search_tokens("pepe", None).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NotSupported { .. }));
    }
}
