//! Canonical data models shared by all providers and the caching layer.

mod detail;
mod kline;
mod search;
mod token;
mod trades;

pub use detail::TokenDetail;
pub use kline::{Candle, KlineSeries};
pub use search::{SearchHit, SearchResults};
pub use token::{TokenRecord, DEFAULT_CHAIN, UNKNOWN};
pub use trades::{TradePage, TradeRecord};
