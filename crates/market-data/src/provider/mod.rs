//! Upstream providers and the traits they implement.

pub mod ave;
pub mod dexscreener;
pub mod sample;
mod traits;

pub use ave::AveProvider;
pub use dexscreener::DexScreenerProvider;
pub use sample::StaticSampleProvider;
pub use traits::{SampleDataProvider, TokenDataProvider};
