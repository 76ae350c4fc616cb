use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::model::candle::Candle;

/// A derived column aligned with the candles of its series. Immutable once inserted.
pub type Column = Arc<[Option<f64>]>;

/// An ordered candle sequence plus the indicator columns computed over it.
///
/// Each column is written exactly once; recomputing an indicator with another window
/// yields a column under a different name. Columns are shared read-only via `Arc`, so
/// cloning a series or handing a column to another thread never copies the values.
#[derive(Debug, Clone, Serialize)]
pub struct Series {
    name: String,
    candles: Vec<Candle>,
    columns: BTreeMap<String, Column>,
}

impl Series {
    /// Build a series, rejecting candles whose `period_start` is not strictly increasing.
    pub fn new(name: impl Into<String>, candles: Vec<Candle>) -> EngineResult<Self> {
        if let Some(pair) = candles
            .windows(2)
            .find(|w| w[1].period_start <= w[0].period_start)
        {
            return Err(EngineError::InvalidInput(format!(
                "candle at {} does not follow {}",
                pair[1].period_start, pair[0].period_start
            )));
        }
        Ok(Self {
            name: name.into(),
            candles,
            columns: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn latest(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Close prices as an optional-valued column, the input every price indicator reads.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.candles.iter().map(|c| Some(c.close)).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|c| c.as_ref())
    }

    /// Value of column `name` at position `index`; `None` when absent or unknown.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.column(name)?.get(index).copied().flatten()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> EngineResult<()> {
        let name = name.into();
        if values.len() != self.candles.len() {
            return Err(EngineError::ColumnLength {
                name,
                expected: self.candles.len(),
                actual: values.len(),
            });
        }
        if self.columns.contains_key(&name) {
            return Err(EngineError::DuplicateColumn(name));
        }
        self.columns.insert(name, values.into());
        Ok(())
    }

    /// Copy of the series from candle `start` onward, columns sliced alongside.
    pub(crate) fn tail_from(&self, start: usize) -> Self {
        let start = start.min(self.candles.len());
        Self {
            name: self.name.clone(),
            candles: self.candles[start..].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), Column::from(&col[start..])))
                .collect(),
        }
    }
}
