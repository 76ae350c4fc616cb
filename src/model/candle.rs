use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::model::tick::Tick;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub period_start: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub volume_quote: f64,
    pub tick_count: u32,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Floor `timestamp` to the start of its `interval_secs` bucket.
pub fn bucket_start(timestamp: DateTime<Utc>, interval_secs: i64) -> EngineResult<DateTime<Utc>> {
    if interval_secs <= 0 {
        return Err(EngineError::InvalidInput(format!(
            "bucket duration must be > 0 seconds, got {interval_secs}"
        )));
    }
    let secs = timestamp.timestamp().div_euclid(interval_secs) * interval_secs;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        EngineError::InvalidInput(format!("bucket start {secs} is out of range"))
    })
}

/// Aggregates ticks into a single candle over one time bucket.
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    volume_quote: f64,
    tick_count: u32,
    open_time: DateTime<Utc>,
    interval_secs: i64,
}

impl CandleBuilder {
    /// Start a new candle. The bucket is aligned to the interval, which must be positive.
    pub fn new(tick: &Tick, interval_secs: i64) -> EngineResult<Self> {
        let open_time = bucket_start(tick.timestamp, interval_secs)?;
        Ok(Self {
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
            volume: tick.volume_base,
            volume_quote: tick.volume_quote,
            tick_count: 1,
            open_time,
            interval_secs,
        })
    }

    /// Fold another tick of the same bucket into the candle.
    pub fn update(&mut self, tick: &Tick) {
        self.high = self.high.max(tick.high);
        self.low = self.low.min(tick.low);
        self.close = tick.close;
        self.volume += tick.volume_base;
        self.volume_quote += tick.volume_quote;
        self.tick_count = self.tick_count.saturating_add(1);
    }

    pub fn open_time(&self) -> DateTime<Utc> {
        self.open_time
    }

    /// Check if a timestamp belongs to this candle's time bucket.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let offset = timestamp.timestamp() - self.open_time.timestamp();
        (0..self.interval_secs).contains(&offset)
    }

    /// Finalize into an immutable Candle.
    pub fn finish(&self) -> Candle {
        Candle {
            period_start: self.open_time,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            volume_quote: self.volume_quote,
            tick_count: self.tick_count,
        }
    }
}
