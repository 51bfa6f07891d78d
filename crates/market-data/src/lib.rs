//! Tokendeck Market Data Crate
//!
//! Provider-agnostic token market data fetching for the tokendeck service.
//!
//! # Overview
//!
//! Each upstream API gets one [`TokenDataProvider`] implementation that
//! pulls raw provider JSON and normalizes it into the canonical
//! [`TokenRecord`] shape, so everything downstream (the caching layer, the
//! home-view aggregator, the service facade) is insulated from
//! provider-specific schemas.
//!
//! Providers:
//! - [`DexScreenerProvider`] - boosted-token listing
//! - [`AveProvider`] - hot-topic rankings, token search, token detail
//! - [`StaticSampleProvider`] - fixed fallback list and sample kline/trade
//!   data, behind the [`SampleDataProvider`] trait
//!
//! Every fetch enforces a hard timeout and returns a [`MarketDataError`]
//! on a non-success status or an unusable payload; a single malformed
//! record inside an otherwise valid batch is skipped, never fatal.

pub mod errors;
pub mod models;
pub mod provider;

pub use errors::MarketDataError;
pub use models::{
    Candle, KlineSeries, SearchHit, SearchResults, TokenDetail, TokenRecord, TradePage,
    TradeRecord, DEFAULT_CHAIN, UNKNOWN,
};
pub use provider::{
    AveProvider, DexScreenerProvider, SampleDataProvider, StaticSampleProvider, TokenDataProvider,
};
