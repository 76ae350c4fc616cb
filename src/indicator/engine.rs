use std::thread;

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::model::series::Series;

use super::bollinger::{bollinger, DEFAULT_BOLLINGER_K, DEFAULT_BOLLINGER_WINDOW};
use super::macd::{macd, DEFAULT_MACD_FAST, DEFAULT_MACD_SIGNAL, DEFAULT_MACD_SLOW};
use super::order_block::DEFAULT_ORDER_BLOCK_WINDOW;
use super::rsi::{rsi, DEFAULT_RSI_WINDOW};
use super::stats::simple_moving_average;

pub const RSI: &str = "RSI";
pub const BB_UPPER: &str = "BB_upper";
pub const BB_MIDDLE: &str = "BB_middle";
pub const BB_LOWER: &str = "BB_lower";
pub const MACD: &str = "MACD";
pub const SIGNAL: &str = "Signal";
pub const MACD_HIST: &str = "MACD_hist";

pub fn ma_column(window: usize) -> String {
    format!("MA_{window}")
}

/// Windows and spans for every indicator the engine derives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_window: usize,
    pub ma_windows: Vec<usize>,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub order_block_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_window: DEFAULT_RSI_WINDOW,
            ma_windows: vec![50, 100, 200],
            bollinger_window: DEFAULT_BOLLINGER_WINDOW,
            bollinger_k: DEFAULT_BOLLINGER_K,
            macd_fast: DEFAULT_MACD_FAST,
            macd_slow: DEFAULT_MACD_SLOW,
            macd_signal: DEFAULT_MACD_SIGNAL,
            order_block_window: DEFAULT_ORDER_BLOCK_WINDOW,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> EngineResult<()> {
        let windows = [
            ("rsi_window", self.rsi_window),
            ("bollinger_window", self.bollinger_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("order_block_window", self.order_block_window),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(EngineError::InvalidInput(format!("{name} must be > 0")));
        }
        if self.ma_windows.contains(&0) {
            return Err(EngineError::InvalidInput(
                "ma_windows entries must be > 0".to_string(),
            ));
        }
        let mut seen = self.ma_windows.clone();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != self.ma_windows.len() {
            return Err(EngineError::InvalidInput(
                "ma_windows contains duplicates".to_string(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(EngineError::InvalidInput(format!(
                "macd_fast ({}) must be < macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !self.bollinger_k.is_finite() || self.bollinger_k < 0.0 {
            return Err(EngineError::InvalidInput(
                "bollinger_k must be finite and >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

type NamedColumns = Vec<(String, Vec<Option<f64>>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Rsi,
    Ma(usize),
    Bollinger,
    Macd,
}

/// Derives the indicator columns of a series.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    fn families(&self) -> Vec<Family> {
        let mut out = vec![Family::Rsi];
        out.extend(self.config.ma_windows.iter().map(|w| Family::Ma(*w)));
        out.push(Family::Bollinger);
        out.push(Family::Macd);
        out
    }

    fn compute_family(&self, family: Family, closes: &[Option<f64>]) -> EngineResult<NamedColumns> {
        let cfg = &self.config;
        Ok(match family {
            Family::Rsi => vec![(RSI.to_string(), rsi(closes, cfg.rsi_window)?)],
            Family::Ma(window) => vec![(ma_column(window), simple_moving_average(closes, window)?)],
            Family::Bollinger => {
                let bands = bollinger(closes, cfg.bollinger_window, cfg.bollinger_k)?;
                vec![
                    (BB_UPPER.to_string(), bands.upper),
                    (BB_MIDDLE.to_string(), bands.middle),
                    (BB_LOWER.to_string(), bands.lower),
                ]
            }
            Family::Macd => {
                let out = macd(closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal)?;
                vec![
                    (MACD.to_string(), out.macd),
                    (SIGNAL.to_string(), out.signal),
                    (MACD_HIST.to_string(), out.histogram),
                ]
            }
        })
    }

    fn check_input(series: &Series) -> EngineResult<Vec<Option<f64>>> {
        if series.is_empty() {
            return Err(EngineError::InsufficientData);
        }
        let closes = series.closes();
        if let Some(c) = series.candles().iter().find(|c| !c.close.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "non-finite close at {}",
                c.period_start
            )));
        }
        Ok(closes)
    }

    /// Compute every configured column without touching the series.
    pub fn compute(&self, series: &Series) -> EngineResult<NamedColumns> {
        let closes = Self::check_input(series)?;
        let mut out = Vec::new();
        for family in self.families() {
            out.extend(self.compute_family(family, &closes)?);
        }
        Ok(out)
    }

    /// Compute each indicator family on its own thread. Workers only read the closes;
    /// the caller collects their columns in a fixed order.
    pub fn compute_parallel(&self, series: &Series) -> EngineResult<NamedColumns> {
        let closes = Self::check_input(series)?;
        let closes = closes.as_slice();
        let families = self.families();

        let results: Vec<EngineResult<NamedColumns>> = thread::scope(|scope| {
            let handles: Vec<_> = families
                .iter()
                .map(|family| scope.spawn(move || self.compute_family(*family, closes)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        });

        let mut out = Vec::new();
        for result in results {
            out.extend(result?);
        }
        Ok(out)
    }

    /// Insert every configured column into `series`.
    pub fn annotate(&self, series: &mut Series) -> EngineResult<()> {
        let columns = self.compute(series)?;
        insert_all(series, columns)
    }

    pub fn annotate_parallel(&self, series: &mut Series) -> EngineResult<()> {
        let columns = self.compute_parallel(series)?;
        insert_all(series, columns)
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            config: IndicatorConfig::default(),
        }
    }
}

fn insert_all(series: &mut Series, columns: NamedColumns) -> EngineResult<()> {
    if let Some((name, _)) = columns.iter().find(|(name, _)| series.has_column(name)) {
        return Err(EngineError::DuplicateColumn(name.clone()));
    }
    for (name, values) in columns {
        series.insert_column(name, values)?;
    }
    Ok(())
}
