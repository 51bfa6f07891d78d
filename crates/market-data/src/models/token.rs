use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder used when a provider omits a token's name or symbol.
pub const UNKNOWN: &str = "Unknown";

/// Default chain when a provider omits one.
pub const DEFAULT_CHAIN: &str = "ethereum";

/// Canonical normalized token record.
///
/// Produced exclusively by provider normalization; everything downstream
/// (caches, aggregation, the service facade) consumes only this shape and
/// is insulated from provider-specific schemas. Optional fields stay absent
/// rather than defaulting to zero so the wire format matches what the
/// upstream actually knew.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change_24h: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_24h: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders: Option<i64>,
}

impl TokenRecord {
    /// Create a record with only the identity fields set.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        address: impl Into<String>,
        chain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            address: address.into(),
            logo: None,
            price: None,
            chain: chain.into(),
            price_change_24h: None,
            volume_24h: None,
            market_cap: None,
            holders: None,
        }
    }

    /// Price in USD, treating an unknown price as zero.
    ///
    /// Used for ordering tokens by value, where null prices sort last.
    pub fn price_or_zero(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }
}
