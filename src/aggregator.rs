use std::collections::VecDeque;

use chrono::Duration;

use crate::error::{EngineError, EngineResult};
use crate::model::candle::{Candle, CandleBuilder};
use crate::model::series::Series;
use crate::model::tick::Tick;

fn interval_secs(bucket: Duration) -> EngineResult<i64> {
    if bucket <= Duration::zero() {
        return Err(EngineError::InvalidInput(format!(
            "bucket duration must be > 0, got {bucket}"
        )));
    }
    if bucket != Duration::seconds(bucket.num_seconds()) {
        return Err(EngineError::InvalidInput(format!(
            "bucket duration must be whole seconds, got {bucket}"
        )));
    }
    Ok(bucket.num_seconds())
}

fn check_tick(tick: &Tick) -> EngineResult<()> {
    if tick.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidInput(format!(
            "tick at {} carries a non-finite price or volume",
            tick.timestamp
        )))
    }
}

/// Buckets raw ticks into fixed-interval OHLCV candles.
///
/// Only buckets that received at least one tick produce a candle; gaps stay gaps.
#[derive(Debug, Clone, Copy)]
pub struct CandleAggregator {
    interval_secs: i64,
}

impl CandleAggregator {
    pub fn new(bucket: Duration) -> EngineResult<Self> {
        Ok(Self {
            interval_secs: interval_secs(bucket)?,
        })
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_secs
    }

    /// Aggregate a batch of ticks. Out-of-order input is stably sorted by timestamp first,
    /// so ticks sharing a timestamp keep their arrival order for open/close.
    pub fn aggregate(&self, ticks: &[Tick]) -> EngineResult<Vec<Candle>> {
        let mut ordered: Vec<&Tick> = ticks.iter().collect();
        ordered.sort_by_key(|t| t.timestamp);

        let mut candles = Vec::new();
        let mut current: Option<CandleBuilder> = None;
        for tick in ordered {
            check_tick(tick)?;
            if let Some(builder) = current.as_mut() {
                if builder.contains(tick.timestamp) {
                    builder.update(tick);
                    continue;
                }
            }
            let next = CandleBuilder::new(tick, self.interval_secs)?;
            if let Some(done) = current.replace(next) {
                candles.push(done.finish());
            }
        }
        if let Some(done) = current {
            candles.push(done.finish());
        }
        Ok(candles)
    }

    pub fn aggregate_series(&self, name: impl Into<String>, ticks: &[Tick]) -> EngineResult<Series> {
        Series::new(name, self.aggregate(ticks)?)
    }
}

/// Streaming aggregation for live feeds, keeping at most `max_candles` closed candles.
#[derive(Debug, Clone)]
pub struct LiveAggregator {
    interval_secs: i64,
    max_candles: usize,
    current: Option<CandleBuilder>,
    closed: VecDeque<Candle>,
}

impl LiveAggregator {
    pub fn new(bucket: Duration, max_candles: usize) -> EngineResult<Self> {
        if max_candles == 0 {
            return Err(EngineError::InvalidInput(
                "max_candles must be > 0".to_string(),
            ));
        }
        Ok(Self {
            interval_secs: interval_secs(bucket)?,
            max_candles,
            current: None,
            closed: VecDeque::new(),
        })
    }

    /// Feed one tick. Returns the candle it closed, if it opened a later bucket.
    pub fn push(&mut self, tick: &Tick) -> EngineResult<Option<Candle>> {
        check_tick(tick)?;
        if let Some(builder) = self.current.as_mut() {
            if builder.contains(tick.timestamp) {
                builder.update(tick);
                return Ok(None);
            }
            if tick.timestamp < builder.open_time() {
                return Err(EngineError::InvalidInput(format!(
                    "tick at {} precedes open bucket {}",
                    tick.timestamp,
                    builder.open_time()
                )));
            }
        }
        let next = CandleBuilder::new(tick, self.interval_secs)?;
        Ok(self.current.replace(next).map(|done| self.retain(done.finish())))
    }

    /// Close the open bucket, if any.
    pub fn flush(&mut self) -> Option<Candle> {
        self.current.take().map(|done| self.retain(done.finish()))
    }

    fn retain(&mut self, candle: Candle) -> Candle {
        self.closed.push_back(candle.clone());
        while self.closed.len() > self.max_candles {
            self.closed.pop_front();
        }
        candle
    }

    pub fn closed(&self) -> impl Iterator<Item = &Candle> {
        self.closed.iter()
    }

    /// The open bucket as it stands, without closing it.
    pub fn partial(&self) -> Option<Candle> {
        self.current.as_ref().map(CandleBuilder::finish)
    }

    pub fn to_series(&self, name: impl Into<String>) -> EngineResult<Series> {
        Series::new(name, self.closed.iter().cloned().collect())
    }
}
