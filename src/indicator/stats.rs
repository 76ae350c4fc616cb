//! Batch rolling-window statistics over optional-valued columns.
//!
//! `None` in the input marks a gap or a position without history. A rolling window is
//! only defined when all of its positions are present, so a gap restarts the warm-up.

use crate::error::{EngineError, EngineResult};

use super::ema::Ema;
use super::sma::Sma;
use super::std_dev::RollingStd;

fn check_input(series: &[Option<f64>], window: usize, what: &str) -> EngineResult<()> {
    if series.is_empty() {
        return Err(EngineError::InsufficientData);
    }
    if window == 0 {
        return Err(EngineError::InvalidInput(format!("{what} must be > 0")));
    }
    Ok(())
}

pub fn simple_moving_average(
    series: &[Option<f64>],
    window: usize,
) -> EngineResult<Vec<Option<f64>>> {
    check_input(series, window, "SMA window")?;
    let mut sma = Sma::new(window);
    Ok(series
        .iter()
        .map(|value| match value {
            Some(v) => sma.push(*v),
            None => {
                sma.reset();
                None
            }
        })
        .collect())
}

pub fn rolling_std(series: &[Option<f64>], window: usize) -> EngineResult<Vec<Option<f64>>> {
    check_input(series, window, "rolling std window")?;
    let mut sd = RollingStd::new(window);
    Ok(series
        .iter()
        .map(|value| match value {
            Some(v) => sd.push(*v),
            None => {
                sd.reset();
                None
            }
        })
        .collect())
}

/// EMA with `alpha = 2 / (span + 1)`. Gaps yield `None` and leave the recursion untouched.
pub fn exponential_moving_average(
    series: &[Option<f64>],
    span: usize,
) -> EngineResult<Vec<Option<f64>>> {
    check_input(series, span, "EMA span")?;
    let mut ema = Ema::new(span);
    Ok(series.iter().map(|value| value.map(|v| ema.push(v))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn sma_warmup_then_defined() {
        let out = simple_moving_average(&present(&[1.0, 2.0, 3.0, 4.0]), 3).unwrap();
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn sma_gap_restarts_window() {
        let input = vec![Some(1.0), Some(2.0), None, Some(4.0), Some(6.0)];
        let out = simple_moving_average(&input, 2).unwrap();
        assert_eq!(out, vec![None, Some(1.5), None, None, Some(5.0)]);
    }

    #[test]
    fn ema_skips_gap_without_advancing() {
        let input = vec![None, Some(2.0), None, Some(4.0)];
        let out = exponential_moving_average(&input, 3).unwrap();
        assert_eq!(out, vec![None, Some(2.0), None, Some(3.0)]);
    }

    #[test]
    fn empty_input_is_insufficient() {
        assert_eq!(
            simple_moving_average(&[], 3).unwrap_err(),
            EngineError::InsufficientData
        );
        assert_eq!(rolling_std(&[], 3).unwrap_err(), EngineError::InsufficientData);
        assert_eq!(
            exponential_moving_average(&[], 3).unwrap_err(),
            EngineError::InsufficientData
        );
    }

    #[test]
    fn zero_window_is_invalid() {
        assert!(matches!(
            simple_moving_average(&[Some(1.0)], 0),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            exponential_moving_average(&[Some(1.0)], 0),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
