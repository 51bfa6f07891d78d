//! Ave.ai market data provider.
//!
//! Serves three lookups from the Ave.ai v2 API, authenticated with an
//! `X-API-KEY` header:
//! - hot-topic token rankings via `/v2/ranks?topic=hot` (the feed),
//! - token search via `/v2/tokens?keyword=`,
//! - token detail via the same endpoint, keyed by contract address.
//!
//! Ave responses wrap everything in `{ "status": 1, "data": [...] }` and
//! interleave numbers and numeric strings in the same fields, so all
//! numeric extraction goes through tolerant helpers. The `appendix` field
//! is an embedded JSON string carrying the long token name and social
//! links; an unparseable appendix is ignored per record.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{SearchHit, TokenDetail, TokenRecord, DEFAULT_CHAIN, UNKNOWN};
use crate::provider::TokenDataProvider;

const BASE_URL: &str = "https://prod.ave-api.com";
const PROVIDER_ID: &str = "AVE";

/// Hard timeout for the ranks and detail endpoints.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Search keeps a tighter budget since it sits on an interactive path.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Liquidity-pool placeholders served until a real LP endpoint is wired in.
const LP_AMOUNT_PLACEHOLDER: i64 = 269;
const LOCK_PERCENT_PLACEHOLDER: f64 = 99.97;

// ============================================================================
// API Response Structures
// ============================================================================

/// Envelope wrapping every Ave response.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<i64>,
    data: Option<Vec<Value>>,
}

/// One token entry, shared by the ranks and tokens endpoints. Numeric
/// fields stay as raw values because the API mixes numbers and strings.
#[derive(Debug, Deserialize)]
struct RawAveToken {
    symbol: Option<String>,
    name: Option<String>,
    /// Contract address.
    token: Option<String>,
    logo_url: Option<String>,
    current_price_usd: Option<Value>,
    chain: Option<String>,
    price_change_24h: Option<Value>,
    tx_volume_u_24h: Option<Value>,
    market_cap: Option<Value>,
    holders: Option<Value>,
    /// Raw total supply, before decimal adjustment.
    total: Option<Value>,
    decimal: Option<Value>,
    risk_score: Option<Value>,
    /// JSON-encoded string with extra metadata.
    appendix: Option<String>,
}

/// Decoded `appendix` payload.
#[derive(Debug, Default, Deserialize)]
struct Appendix {
    #[serde(rename = "tokenName")]
    token_name: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    telegram: Option<String>,
    #[serde(default)]
    twitter: Option<String>,
}

impl RawAveToken {
    fn appendix(&self) -> Appendix {
        self.appendix
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tolerant field extraction
// ============================================================================

/// Extract a decimal from a JSON number or numeric string.
fn decimal_field(value: Option<&Value>) -> Option<Decimal> {
    match value? {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract an integer from a JSON number or numeric string.
fn i64_field(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Render a field as a plain string, for pass-through values like
/// market cap that the API serves in mixed types.
fn string_field(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

// ============================================================================
// AveProvider
// ============================================================================

/// Ave.ai provider: hot-ranks feed, token search, and token detail.
pub struct AveProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AveProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// GET an Ave endpoint and return the raw body.
    async fn fetch(
        &self,
        path: &str,
        params: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Ave request: {} with {} params", path, params.len());

        let response = self
            .client
            .get(&url)
            .header("Accept", "*/*")
            .header("X-API-KEY", &self.api_key)
            .query(params)
            .timeout(timeout)
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

    /// Unwrap the `{status, data}` envelope. Returns `None` when the API
    /// answered but reported no usable data (`status != 1` or empty
    /// `data`); the caller decides whether that means "not found" or
    /// "feed unavailable".
    fn unwrap_envelope(body: &str) -> Result<Option<Vec<Value>>, MarketDataError> {
        let envelope: Envelope =
            serde_json::from_str(body).map_err(|e| MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        if envelope.status != Some(1) {
            return Ok(None);
        }
        match envelope.data {
            Some(data) if !data.is_empty() => Ok(Some(data)),
            _ => Ok(None),
        }
    }

    /// Normalize one ranked token into the canonical record.
    fn normalize_feed_token(raw: Value) -> Option<TokenRecord> {
        let entry: RawAveToken = serde_json::from_value(raw).ok()?;
        let appendix = entry.appendix();

        let symbol = entry.symbol.clone().unwrap_or_else(|| UNKNOWN.to_string());
        // The ranks payload has no long-form name field of its own; the
        // appendix carries it when present.
        let name = appendix.token_name.unwrap_or_else(|| symbol.clone());

        let mut token = TokenRecord::new(
            name,
            symbol,
            entry.token.clone().unwrap_or_default(),
            entry
                .chain
                .clone()
                .unwrap_or_else(|| DEFAULT_CHAIN.to_string()),
        );
        token.logo = entry.logo_url.clone();
        token.price = Some(decimal_field(entry.current_price_usd.as_ref()).unwrap_or_default());
        token.price_change_24h =
            Some(decimal_field(entry.price_change_24h.as_ref()).unwrap_or_default());
        token.volume_24h = Some(decimal_field(entry.tx_volume_u_24h.as_ref()).unwrap_or_default());
        token.market_cap = decimal_field(entry.market_cap.as_ref());
        token.holders = Some(i64_field(entry.holders.as_ref()).unwrap_or(0));
        Some(token)
    }

    fn parse_feed(body: &str) -> Result<Vec<TokenRecord>, MarketDataError> {
        let entries =
            Self::unwrap_envelope(body)?.ok_or_else(|| MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: "ranks response had no usable data".to_string(),
            })?;

        let total = entries.len();
        let tokens: Vec<TokenRecord> = entries
            .into_iter()
            .filter_map(Self::normalize_feed_token)
            .collect();

        // A ranks batch where nothing normalizes is an unusable payload,
        // not an empty listing.
        if tokens.is_empty() {
            return Err(MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: format!("all {} rank entries were unusable", total),
            });
        }
        if tokens.len() < total {
            warn!("Ave: skipped {} malformed rank entries", total - tokens.len());
        }

        Ok(tokens)
    }

    /// Build the detail view from the first matching token entry.
    fn parse_detail(body: &str, address: &str) -> Result<TokenDetail, MarketDataError> {
        let mut entries = Self::unwrap_envelope(body)?
            .ok_or_else(|| MarketDataError::NotFound(address.to_string()))?;

        let entry: RawAveToken = serde_json::from_value(entries.remove(0)).map_err(|e| {
            MarketDataError::MalformedData {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse token entry: {}", e),
            }
        })?;
        let appendix = entry.appendix();

        let total_raw = decimal_field(entry.total.as_ref()).unwrap_or_default();
        let decimals = i64_field(entry.decimal.as_ref()).unwrap_or(18);
        let total_supply =
            total_raw.to_f64().unwrap_or(0.0) / 10f64.powi(decimals.clamp(0, 76) as i32);

        Ok(TokenDetail {
            symbol: entry.symbol.clone().unwrap_or_default(),
            name: entry.name.clone().unwrap_or_default(),
            address: entry.token.clone().unwrap_or_default(),
            logo: entry.logo_url.clone().unwrap_or_default(),
            price: decimal_field(entry.current_price_usd.as_ref()).unwrap_or_default(),
            price_change_24h: decimal_field(entry.price_change_24h.as_ref()).unwrap_or_default(),
            volume_24h: decimal_field(entry.tx_volume_u_24h.as_ref()).unwrap_or_default(),
            market_cap: decimal_field(entry.market_cap.as_ref()).unwrap_or_default(),
            total_supply,
            holders: i64_field(entry.holders.as_ref()).unwrap_or(0),
            chain: entry.chain.clone().unwrap_or_default(),
            lp_amount: LP_AMOUNT_PLACEHOLDER,
            lock_percent: LOCK_PERCENT_PLACEHOLDER,
            website: appendix.website.unwrap_or_default(),
            telegram: appendix.telegram.unwrap_or_default(),
            twitter: appendix.twitter.unwrap_or_default(),
        })
    }

    fn parse_search(body: &str, keyword: &str) -> Result<Vec<SearchHit>, MarketDataError> {
        let entries = Self::unwrap_envelope(body)?
            .ok_or_else(|| MarketDataError::NotFound(keyword.to_string()))?;

        let hits = entries
            .into_iter()
            .filter_map(|raw| {
                let entry: RawAveToken = serde_json::from_value(raw).ok()?;
                let appendix = entry.appendix();

                let symbol = entry.symbol.clone().unwrap_or_default();
                let name = entry
                    .name
                    .clone()
                    .filter(|n| !n.is_empty())
                    .or(appendix.token_name)
                    .unwrap_or_else(|| symbol.clone());

                Some(SearchHit {
                    token: entry.token.clone().unwrap_or_default(),
                    chain: entry.chain.clone().unwrap_or_default(),
                    symbol,
                    name,
                    logo_url: entry.logo_url.clone().unwrap_or_default(),
                    current_price_usd: decimal_field(entry.current_price_usd.as_ref())
                        .unwrap_or_default(),
                    price_change_24h: decimal_field(entry.price_change_24h.as_ref())
                        .unwrap_or_default(),
                    tx_volume_u_24h: decimal_field(entry.tx_volume_u_24h.as_ref())
                        .unwrap_or_default(),
                    holders: i64_field(entry.holders.as_ref()).unwrap_or(0),
                    market_cap: string_field(entry.market_cap.as_ref(), "0"),
                    risk_score: i64_field(entry.risk_score.as_ref()).unwrap_or(0),
                })
            })
            .collect();

        Ok(hits)
    }
}

#[async_trait]
impl TokenDataProvider for AveProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_top_tokens(&self) -> Result<Vec<TokenRecord>, MarketDataError> {
        let body = self
            .fetch("/v2/ranks", &[("topic", "hot")], REQUEST_TIMEOUT)
            .await?;
        let tokens = Self::parse_feed(&body)?;
        debug!("Ave returned {} hot-ranked tokens", tokens.len());
        Ok(tokens)
    }

    async fn search_tokens(
        &self,
        keyword: &str,
        chain: Option<&str>,
    ) -> Result<Vec<SearchHit>, MarketDataError> {
        let mut params = vec![("keyword", keyword)];
        if let Some(chain) = chain {
            params.push(("chain", chain));
        }
        let body = self.fetch("/v2/tokens", &params, SEARCH_TIMEOUT).await?;
        Self::parse_search(&body, keyword)
    }

    async fn token_detail(
        &self,
        address: &str,
        chain: &str,
    ) -> Result<TokenDetail, MarketDataError> {
        let body = self
            .fetch(
                "/v2/tokens",
                &[("keyword", address), ("chain", chain)],
                REQUEST_TIMEOUT,
            )
            .await?;
        Self::parse_detail(&body, address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ranks_body() -> String {
        r#"{
            "status": 1,
            "data": [
                {
                    "symbol": "WIF",
                    "token": "0x111",
                    "logo_url": "https://img/wif.png",
                    "current_price_usd": "2.41",
                    "chain": "solana",
                    "price_change_24h": -3.2,
                    "tx_volume_u_24h": "1250000.5",
                    "market_cap": "2400000000",
                    "holders": "151234",
                    "appendix": "{\"tokenName\":\"dogwifhat\",\"website\":\"https://wif.com\"}"
                },
                {
                    "symbol": "BONK",
                    "token": "0x222",
                    "current_price_usd": 0.000021,
                    "chain": "solana",
                    "holders": 90000
                }
            ]
        }"#
        .to_string()
    }

    #[test]
    fn provider_id() {
        assert_eq!(AveProvider::new("key".to_string()).id(), "AVE");
    }

    #[test]
    fn parse_feed_reads_appendix_name() {
        let tokens = AveProvider::parse_feed(&ranks_body()).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].name, "dogwifhat");
        assert_eq!(tokens[0].symbol, "WIF");
        assert_eq!(tokens[0].price, Some(dec!(2.41)));
        assert_eq!(tokens[0].holders, Some(151234));
        // No appendix: symbol doubles as the name.
        assert_eq!(tokens[1].name, "BONK");
        assert_eq!(tokens[1].price_change_24h, Some(Decimal::ZERO));
    }

    #[test]
    fn parse_feed_rejects_bad_status() {
        let err = AveProvider::parse_feed(r#"{ "status": 0, "data": [] }"#).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedData { .. }));
    }

    #[test]
    fn parse_feed_rejects_fully_unusable_data() {
        // A populated batch where nothing normalizes must be an error,
        // not an empty success that would overwrite stale cache data.
        let body = r#"{ "status": 1, "data": [ "not-an-object", 42 ] }"#;
        let err = AveProvider::parse_feed(body).unwrap_err();
        assert!(matches!(err, MarketDataError::MalformedData { .. }));
    }

    #[test]
    fn parse_detail_adjusts_supply_for_decimals() {
        let body = r#"{
            "status": 1,
            "data": [
                {
                    "symbol": "WIF",
                    "name": "dogwifhat",
                    "token": "0x111",
                    "current_price_usd": "2.41",
                    "chain": "solana",
                    "total": "1000000000000000000000",
                    "decimal": 18,
                    "holders": 151234,
                    "appendix": "{\"website\":\"https://wif.com\",\"twitter\":\"https://x.com/wif\"}"
                }
            ]
        }"#;

        let detail = AveProvider::parse_detail(body, "0x111").unwrap();
        assert_eq!(detail.name, "dogwifhat");
        assert_eq!(detail.price, dec!(2.41));
        assert!((detail.total_supply - 1000.0).abs() < 1e-6);
        assert_eq!(detail.website, "https://wif.com");
        assert_eq!(detail.twitter, "https://x.com/wif");
        assert_eq!(detail.lp_amount, 269);
    }

    #[test]
    fn parse_detail_maps_empty_data_to_not_found() {
        let err = AveProvider::parse_detail(r#"{ "status": 1, "data": [] }"#, "0x404").unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[test]
    fn parse_search_falls_back_through_name_sources() {
        let body = r#"{
            "status": 1,
            "data": [
                { "symbol": "AAA", "token": "0x1", "chain": "bsc", "name": "Alpha" },
                { "symbol": "BBB", "token": "0x2", "chain": "bsc",
                  "appendix": "{\"tokenName\":\"Beta Coin\"}" },
                { "symbol": "CCC", "token": "0x3", "chain": "bsc", "market_cap": 123456 }
            ]
        }"#;

        let hits = AveProvider::parse_search(body, "coin").unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].name, "Alpha");
        assert_eq!(hits[1].name, "Beta Coin");
        assert_eq!(hits[2].name, "CCC");
        assert_eq!(hits[2].market_cap, "123456");
    }

    #[test]
    fn parse_search_maps_no_match_to_not_found() {
        let err = AveProvider::parse_search(r#"{ "status": 1, "data": [] }"#, "zzz").unwrap_err();
        assert!(matches!(err, MarketDataError::NotFound(_)));
    }

    #[test]
    fn tolerant_numeric_extraction() {
        let num = serde_json::json!(1.5);
        let text = serde_json::json!("2.75");
        let junk = serde_json::json!({ "nested": true });

        assert_eq!(decimal_field(Some(&num)), Some(dec!(1.5)));
        assert_eq!(decimal_field(Some(&text)), Some(dec!(2.75)));
        assert_eq!(decimal_field(Some(&junk)), None);
        assert_eq!(decimal_field(None), None);

        assert_eq!(i64_field(Some(&serde_json::json!("42"))), Some(42));
        assert_eq!(i64_field(Some(&serde_json::json!(42.9))), Some(42));
        assert_eq!(string_field(Some(&junk), "0"), "0");
    }

    #[test]
    fn unparseable_appendix_is_ignored() {
        let raw = RawAveToken {
            symbol: Some("X".to_string()),
            name: None,
            token: None,
            logo_url: None,
            current_price_usd: None,
            chain: None,
            price_change_24h: None,
            tx_volume_u_24h: None,
            market_cap: None,
            holders: None,
            total: None,
            decimal: None,
            risk_score: None,
            appendix: Some("{not valid json".to_string()),
        };
        let appendix = raw.appendix();
        assert!(appendix.token_name.is_none());
    }
}
