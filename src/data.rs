use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashMap;

/// One `[timestamp_ms, value]` pair from a CoinGecko series.
#[derive(Debug, Deserialize)]
pub struct SeriesPoint(pub i64, pub f64);

/// Payload of the `/coins/{id}/market_chart/range` endpoint: three
/// parallel series keyed by millisecond timestamp.
#[derive(Debug, Default, Deserialize)]
pub struct MarketChart {
    #[serde(default)]
    pub prices: Vec<SeriesPoint>,
    #[serde(default)]
    pub market_caps: Vec<SeriesPoint>,
    #[serde(default)]
    pub total_volumes: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub market_cap: f64,
    pub total_volume: f64,
}

/// All-time high/low for a coin. `None` when the coin-info request
/// failed or the fields were missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinSnapshot {
    pub ath: Option<f64>,
    pub atl: Option<f64>,
}

// Field order is the output column order.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub price: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub ath: Option<f64>,
    pub atl: Option<f64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl MarketChart {
    /// Join the three series on exact timestamp, preserving the order of
    /// the price series. A timestamp missing from either sibling series
    /// is dropped, as is one that cannot be represented as a datetime.
    pub fn into_points(self) -> Vec<PricePoint> {
        let caps: HashMap<i64, f64> = self
            .market_caps
            .into_iter()
            .map(|SeriesPoint(ts, value)| (ts, value))
            .collect();
        let volumes: HashMap<i64, f64> = self
            .total_volumes
            .into_iter()
            .map(|SeriesPoint(ts, value)| (ts, value))
            .collect();

        self.prices
            .into_iter()
            .filter_map(|SeriesPoint(ts, price)| {
                let market_cap = *caps.get(&ts)?;
                let total_volume = *volumes.get(&ts)?;
                let timestamp = DateTime::from_timestamp_millis(ts)?.naive_utc();
                Some(PricePoint {
                    timestamp,
                    price,
                    market_cap,
                    total_volume,
                })
            })
            .collect()
    }
}
