//! Tokendeck Core Crate
//!
//! The caching engine behind the tokendeck token data service: named TTL
//! cache slots with disk snapshots and stale fallback, background
//! refresh loops, the multi-source home-view aggregator, and
//! parameterized query caches, all behind the [`TokenService`] facade.
//!
//! # Overview
//!
//! Three named keys (`token_boosts`, `home_data`, `ave_data`) each own a
//! TTL, a refresh period, and a disk snapshot slot. Reads are served from
//! memory; an expired entry triggers an on-demand refresh, and when that
//! refresh fails the expired entry is served marked stale rather than
//! failing the read. Detail, kline, trade, and search lookups go through
//! bounded per-parameter query caches instead of the named slots.
//!
//! # Wiring
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tokendeck_core::{CacheConfig, TokenService};
//! use tokendeck_market_data::{AveProvider, DexScreenerProvider, StaticSampleProvider};
//!
//! let ave = Arc::new(AveProvider::new("api-key".to_string()));
//! let service = TokenService::new(
//!     CacheConfig::default(),
//!     Arc::new(DexScreenerProvider::new()),
//!     Arc::clone(&ave) as _,
//!     ave as _,
//!     Arc::new(StaticSampleProvider::new()),
//! );
//! let _handles = service.start();
//! ```

pub mod aggregator;
pub mod cache;
pub mod errors;
pub mod feeds;
pub mod refresh;
pub mod service;

#[cfg(test)]
mod test_util;

pub use aggregator::Aggregator;
pub use cache::{CacheConfig, CacheHealth, CacheStore, NamedKey, QueryCache, SlotStatus};
pub use errors::{Error, Result};
pub use feeds::{FeedSource, HomeFeed, TokenFeed};
pub use refresh::{RefreshScheduler, Refresher};
pub use service::{Cached, RefreshReport, RefreshTarget, TokenService};
