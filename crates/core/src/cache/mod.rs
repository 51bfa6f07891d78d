//! The in-memory cache: named TTL slots with disk snapshots, plus the
//! parameterized query cache.

mod entry;
mod query;
mod slot;
mod store;

pub use entry::Entry;
pub use query::{detail_key, kline_key, search_key, trades_key, QueryCache};
pub use slot::{CacheSlot, SlotStatus, TokenCount};
pub use store::{CacheConfig, CacheHealth, CacheStore};

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed set of long-lived cache keys. Each has its own TTL, its own
/// refresh period, and its own disk snapshot slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKey {
    TokenBoosts,
    HomeData,
    AveData,
}

impl NamedKey {
    pub const ALL: [NamedKey; 3] = [NamedKey::TokenBoosts, NamedKey::HomeData, NamedKey::AveData];

    pub fn as_str(&self) -> &'static str {
        match self {
            NamedKey::TokenBoosts => "token_boosts",
            NamedKey::HomeData => "home_data",
            NamedKey::AveData => "ave_data",
        }
    }

    /// File name of this key's disk snapshot slot.
    pub fn snapshot_file(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_match_snapshot_files() {
        assert_eq!(NamedKey::TokenBoosts.as_str(), "token_boosts");
        assert_eq!(NamedKey::HomeData.snapshot_file(), "home_data.json");
        assert_eq!(NamedKey::ALL.len(), 3);
    }
}
