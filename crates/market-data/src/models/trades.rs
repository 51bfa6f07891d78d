use serde::{Deserialize, Serialize};

/// One row of the trade tape. Values are pre-formatted display strings,
/// matching the shape the upstream tape endpoint serves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub time: String,
    pub price: String,
    pub amount: String,
    pub total: String,
    pub user: String,
}

impl TradeRecord {
    pub fn new(time: &str, price: &str, amount: &str, total: &str, user: &str) -> Self {
        Self {
            time: time.to_string(),
            price: price.to_string(),
            amount: amount.to_string(),
            total: total.to_string(),
            user: user.to_string(),
        }
    }
}

/// A page of recent trades for one token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradePage {
    pub transactions: Vec<TradeRecord>,
    /// Total rows available before the limit was applied.
    pub total: usize,
    pub symbol: String,
    pub chain: String,
}
