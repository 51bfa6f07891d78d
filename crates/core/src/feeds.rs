//! Cache payload shapes for the named slots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tokendeck_market_data::TokenRecord;

use crate::cache::TokenCount;

/// Payload of the `token_boosts` and `ave_data` slots: one provider's
/// token listing plus bookkeeping fields.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenFeed {
    pub tokens: Vec<TokenRecord>,
    pub count: usize,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl TokenFeed {
    pub fn new(tokens: Vec<TokenRecord>) -> Self {
        Self {
            count: tokens.len(),
            tokens,
            success: true,
            timestamp: Utc::now(),
        }
    }
}

impl TokenCount for TokenFeed {
    fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Which tier of the home-view priority chain supplied the tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    /// Valid cached `ave_data`.
    CachedAve,
    /// Valid cached `token_boosts`.
    CachedBoosts,
    /// On-demand refresh of `ave_data`.
    RefreshedAve,
    /// On-demand refresh of `token_boosts`.
    RefreshedBoosts,
    /// The static fallback list; every live tier was empty or failing.
    Fallback,
}

/// Payload of the `home_data` slot: the composed home view.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HomeFeed {
    pub tokens: Vec<TokenRecord>,
    pub count: usize,
    /// First tokens in the source's own ranking order.
    pub trending: Vec<TokenRecord>,
    /// Highest-priced tokens, descending, stable on ties.
    pub popular: Vec<TokenRecord>,
    /// Tail of the source list, treated as the newest arrivals.
    #[serde(rename = "new")]
    pub new_listings: Vec<TokenRecord>,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub source: FeedSource,
}

impl TokenCount for HomeFeed {
    fn token_count(&self) -> usize {
        self.tokens.len()
    }
}
