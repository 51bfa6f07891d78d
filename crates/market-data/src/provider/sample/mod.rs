//! Static and synthetic sample data.
//!
//! [`StaticSampleProvider`] is the fallback-data collaborator: it owns the
//! fixed reference token list served when every live source is down, plus
//! the sample trade tape and a synthetic kline walk for lookups that have
//! no live upstream yet. None of this is part of the caching engine's
//! contract; the engine only sees the [`SampleDataProvider`] trait.

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;

use crate::models::{Candle, KlineSeries, TokenRecord, TradePage, TradeRecord};
use crate::provider::SampleDataProvider;

/// Symbol attached to sample kline/trade data.
const SAMPLE_SYMBOL: &str = "BL";
/// Anchor price for the synthetic kline walk.
const SAMPLE_PRICE: f64 = 0.007354;
/// Number of daily candles generated per series.
const KLINE_DAYS: i64 = 30;

const SECONDS_PER_DAY: i64 = 86_400;

/// Default sample data provider.
#[derive(Default)]
pub struct StaticSampleProvider;

impl StaticSampleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SampleDataProvider for StaticSampleProvider {
    fn fallback_tokens(&self) -> Vec<TokenRecord> {
        fallback_tokens()
    }

    fn kline(&self, chain: &str, interval: &str) -> KlineSeries {
        synthetic_kline(chain, interval)
    }

    fn trades(&self, chain: &str, limit: usize) -> TradePage {
        let tape = sample_trades();
        let total = tape.len();
        TradePage {
            transactions: tape.into_iter().take(limit).collect(),
            total,
            symbol: SAMPLE_SYMBOL.to_string(),
            chain: chain.to_string(),
        }
    }
}

/// The fixed reference token list: five major assets with representative
/// prices. Served only when every live source and cache tier is empty.
pub fn fallback_tokens() -> Vec<TokenRecord> {
    let entries: [(&str, &str, &str, &str, &str, Decimal); 5] = [
        (
            "Bitcoin",
            "BTC",
            "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
            "https://cryptologos.cc/logos/bitcoin-btc-logo.png",
            "ethereum",
            Decimal::new(6_254_123, 2),
        ),
        (
            "Ethereum",
            "ETH",
            "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2",
            "https://cryptologos.cc/logos/ethereum-eth-logo.png",
            "ethereum",
            Decimal::new(345_892, 2),
        ),
        (
            "Binance Coin",
            "BNB",
            "0xB8c77482e45F1F44dE1745F52C74426C631bDD52",
            "https://cryptologos.cc/logos/bnb-bnb-logo.png",
            "binance-smart-chain",
            Decimal::new(59_847, 2),
        ),
        (
            "Solana",
            "SOL",
            "So11111111111111111111111111111111111111112",
            "https://cryptologos.cc/logos/solana-sol-logo.png",
            "solana",
            Decimal::new(14_237, 2),
        ),
        (
            "XRP",
            "XRP",
            "native",
            "https://cryptologos.cc/logos/xrp-xrp-logo.png",
            "ripple",
            Decimal::new(5_023, 4),
        ),
    ];

    entries
        .into_iter()
        .map(|(name, symbol, address, logo, chain, price)| {
            let mut token = TokenRecord::new(name, symbol, address, chain);
            token.logo = Some(logo.to_string());
            token.price = Some(price);
            token
        })
        .collect()
}

/// Thirty daily candles following a bounded random walk anchored at the
/// sample price. Candles always satisfy `low <= open, close <= high`.
pub fn synthetic_kline(chain: &str, interval: &str) -> KlineSeries {
    let mut rng = rand::thread_rng();
    let end_time = Utc::now().timestamp();
    let mut candles = Vec::with_capacity(KLINE_DAYS as usize);
    let mut base_price = SAMPLE_PRICE / (1.0 + rng.gen::<f64>() * 0.3);

    for i in 0..KLINE_DAYS {
        let time = end_time - (KLINE_DAYS - 1 - i) * SECONDS_PER_DAY;

        let open = base_price * (0.98 + rng.gen::<f64>() * 0.04);
        let close = base_price * (0.98 + rng.gen::<f64>() * 0.04);
        let high = open.max(close) * (1.0 + rng.gen::<f64>() * 0.03);
        let low = open.min(close) * (1.0 - rng.gen::<f64>() * 0.03);
        let volume = 10_000.0 + rng.gen::<f64>() * 90_000.0;

        candles.push(Candle {
            time,
            open: round_price(open),
            high: round_price(high),
            low: round_price(low),
            close: round_price(close),
            volume: (volume * 100.0).round() / 100.0,
        });

        base_price = close;
    }

    KlineSeries {
        candles,
        symbol: SAMPLE_SYMBOL.to_string(),
        chain: chain.to_string(),
        interval: interval.to_string(),
    }
}

fn round_price(value: f64) -> f64 {
    (value * 1e8).round() / 1e8
}

/// The fixed sample trade tape.
fn sample_trades() -> Vec<TradeRecord> {
    vec![
        TradeRecord::new("01:39", "0.00735", "7,767.464", "57.12", "*df01"),
        TradeRecord::new("01:26", "0.00737", "1,589", "11.703", "*8b28"),
        TradeRecord::new("01:25", "0.00737", "1,980", "14.584", "*832d"),
        TradeRecord::new("00:50", "0.00741", "23,569", "0.175", "*2319"),
        TradeRecord::new("00:01", "0.00737", "82.589", "0.609", "*21fc"),
        TradeRecord::new("23:48", "0.00737", "71.442", "0.526", "*5856(4)"),
        TradeRecord::new("23:01", "0.00736", "110.246", "0.812", "*5637"),
        TradeRecord::new("23:00", "0.00737", "39.96", "0.294", "*26df"),
        TradeRecord::new("22:06", "0.00737", "43.873", "0.323", "*5856(3)"),
        TradeRecord::new("20:15", "0.00736", "47.953", "0.353", "*4a45(2)"),
        TradeRecord::new("19:21", "0.0074", "6.806", "0.0504", "*5856(2)"),
        TradeRecord::new("19:21", "0.00736", "31.426", "0.231", "*4cd0(3)"),
        TradeRecord::new("18:26", "0.00736", "55.044", "0.405", "*2ed2(2)"),
    ]
}
