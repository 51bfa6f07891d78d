use serde::{Deserialize, Serialize};

/// One OHLCV candle. Prices are rounded to 8 decimal places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Unix timestamp (seconds) of the candle open.
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A kline series for one token at one interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KlineSeries {
    #[serde(rename = "klineData")]
    pub candles: Vec<Candle>,
    pub symbol: String,
    pub chain: String,
    pub interval: String,
}
