use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Full detail view for a single token, as returned by the detail lookup.
///
/// Field names are camelCased on the wire to match the public API shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDetail {
    pub symbol: String,
    pub name: String,
    pub address: String,
    pub logo: String,
    pub price: Decimal,
    pub price_change_24h: Decimal,
    pub volume_24h: Decimal,
    pub market_cap: Decimal,
    /// Circulating supply, already adjusted for token decimals.
    pub total_supply: f64,
    pub holders: i64,
    pub chain: String,
    /// Liquidity-pool figures are provider placeholders until a real LP
    /// endpoint is wired in.
    pub lp_amount: i64,
    pub lock_percent: f64,
    pub website: String,
    pub telegram: String,
    pub twitter: String,
}
