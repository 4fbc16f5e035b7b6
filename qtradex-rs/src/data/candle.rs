//! OHLCV candle data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// OHLCV candle data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Symbol (e.g., "BTC/USDT")
    pub symbol: String,
    /// Timeframe (e.g., "5m", "1h", "1d")
    pub timeframe: String,
}

impl Candle {
    /// Create a new candle
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
        symbol: String,
        timeframe: String,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
            timestamp,
            symbol,
            timeframe,
        }
    }

    /// Candle length in seconds, if the timeframe string is understood
    pub fn timeframe_seconds(&self) -> Option<i64> {
        parse_timeframe(&self.timeframe)
    }
}

/// Parse timeframes like `"30s"`, `"5m"`, `"4h"`, `"1d"`, `"1w"` into seconds
pub fn parse_timeframe(timeframe: &str) -> Option<i64> {
    let timeframe = timeframe.trim();
    let split = timeframe.len().checked_sub(1)?;
    let (count, unit) = timeframe.split_at(split);
    let count: i64 = count.parse().ok().filter(|c| *c > 0)?;
    let unit_secs = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 604_800,
        _ => return None,
    };
    Some(count * unit_secs)
}

/// Collection of candles
#[derive(Debug, Clone, Default)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Create new empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from vector of candles
    pub fn from_vec(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// Add a candle
    pub fn push(&mut self, candle: Candle) {
        self.candles.push(candle);
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get candle at index
    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Get high prices as vector
    pub fn highs(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.high).collect()
    }

    /// Get low prices as vector
    pub fn lows(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.low).collect()
    }

    /// Get volumes as vector
    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    /// Sort by timestamp (oldest first)
    pub fn sort_by_time(&mut self) {
        self.candles.sort_by_key(|c| c.timestamp);
    }

    /// Candle length of the series, taken from its first candle
    pub fn timeframe_seconds(&self) -> Option<i64> {
        self.candles.first()?.timeframe_seconds()
    }

    /// Number of candles covering `periods` days.
    ///
    /// Falls back to one candle per period when the timeframe is unknown.
    pub fn periods_to_candles(&self, periods: u32) -> usize {
        match self.timeframe_seconds() {
            Some(secs) => (periods as f64 * SECONDS_PER_DAY / secs as f64).ceil() as usize,
            None => periods as usize,
        }
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_vec(candles)
    }
}
