use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cached payload stamped with the time it was fetched.
///
/// Payload and timestamp are always replaced together; validity is
/// derived from the timestamp and a TTL, never stored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entry<T> {
    pub payload: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    /// Wrap a payload with the current time.
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            fetched_at: Utc::now(),
        }
    }

    /// Wrap a payload with an explicit fetch time.
    pub fn with_timestamp(payload: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            fetched_at,
        }
    }

    /// Wall-clock age of this entry. A timestamp in the future (clock
    /// adjustment, restored snapshot) counts as age zero.
    pub fn age(&self) -> Duration {
        (Utc::now() - self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// True while the entry is younger than the TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}
