use crate::error::EngineResult;

use super::stats::exponential_moving_average;

pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// MACD line, its signal EMA and their difference.
///
/// Both EMAs are seeded with the first close, so the MACD line and the signal line are
/// defined from the first position with no warm-up gap.
pub fn macd(
    closes: &[Option<f64>],
    fast: usize,
    slow: usize,
    signal: usize,
) -> EngineResult<Macd> {
    let fast_ema = exponential_moving_average(closes, fast)?;
    let slow_ema = exponential_moving_average(closes, slow)?;
    let macd: Vec<Option<f64>> = fast_ema
        .into_iter()
        .zip(slow_ema)
        .map(|(f, s)| Some(f? - s?))
        .collect();
    let signal = exponential_moving_average(&macd, signal)?;
    let histogram = macd
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();
    Ok(Macd {
        macd,
        signal,
        histogram,
    })
}
