use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::condition::Condition;
use crate::error::{EngineError, EngineResult};
use crate::model::series::Series;

/// Latest close and the latest value of every computed column.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub period_start: DateTime<Utc>,
    pub close: f64,
    pub values: BTreeMap<String, Option<f64>>,
}

impl Snapshot {
    pub fn latest(series: &Series) -> EngineResult<Self> {
        let i = series.len().checked_sub(1).ok_or(EngineError::EmptySeries)?;
        let candle = &series.candles()[i];
        Ok(Self {
            period_start: candle.period_start,
            close: candle.close,
            values: series
                .column_names()
                .map(|name| (name.to_string(), series.value(name, i)))
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionReport {
    pub condition: String,
    pub triggered: bool,
    pub last_hit: Option<DateTime<Utc>>,
    pub hit_count: usize,
}

impl ConditionReport {
    pub fn evaluate(condition: &Condition, series: &Series) -> Self {
        let hits = condition.hits(series);
        Self {
            condition: condition.to_string(),
            triggered: condition.holds_latest(series),
            last_hit: hits.last().map(|&i| series.candles()[i].period_start),
            hit_count: hits.len(),
        }
    }
}

/// Everything a renderer needs to draw the annotated chart.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub symbol: String,
    pub interval: String,
    /// Source the candles were aggregated from, e.g. the history CSV path.
    pub generated_from: String,
    pub latest: Snapshot,
    pub conditions: Vec<ConditionReport>,
    pub order_blocks: Vec<DateTime<Utc>>,
    pub series: Series,
}

impl Report {
    pub fn build(
        interval: impl Into<String>,
        generated_from: impl Into<String>,
        series: Series,
        conditions: &[Condition],
        order_blocks: &[usize],
    ) -> EngineResult<Self> {
        let latest = Snapshot::latest(&series)?;
        let conditions = conditions
            .iter()
            .map(|c| ConditionReport::evaluate(c, &series))
            .collect();
        let order_blocks = order_blocks
            .iter()
            .filter_map(|&i| series.candles().get(i).map(|c| c.period_start))
            .collect();
        Ok(Self {
            symbol: series.name().to_string(),
            interval: interval.into(),
            generated_from: generated_from.into(),
            latest,
            conditions,
            order_blocks,
            series,
        })
    }
}
