use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One token search result, in the upstream's own field naming.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Token contract address.
    pub token: String,
    pub chain: String,
    pub symbol: String,
    pub name: String,
    pub logo_url: String,
    pub current_price_usd: Decimal,
    pub price_change_24h: Decimal,
    pub tx_volume_u_24h: Decimal,
    pub holders: i64,
    /// Market cap as reported upstream; kept as a string because the
    /// provider interleaves numeric strings and numbers here.
    pub market_cap: String,
    pub risk_score: i64,
}

/// A search response: the matching tokens plus the query that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub tokens: Vec<SearchHit>,
    pub count: usize,
    pub keyword: String,
    /// Chain filter used for the search, or "all".
    pub chain: String,
}

impl SearchResults {
    /// An empty result set for a query that matched nothing.
    pub fn empty(keyword: &str, chain: Option<&str>) -> Self {
        Self {
            tokens: Vec::new(),
            count: 0,
            keyword: keyword.to_string(),
            chain: chain.unwrap_or("all").to_string(),
        }
    }
}
