use crate::error::{EngineError, EngineResult};

use super::stats::{rolling_std, simple_moving_average};

pub const DEFAULT_BOLLINGER_WINDOW: usize = 20;
pub const DEFAULT_BOLLINGER_K: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bands at `k` sample standard deviations around the `window` SMA.
pub fn bollinger(closes: &[Option<f64>], window: usize, k: f64) -> EngineResult<BollingerBands> {
    if !k.is_finite() || k < 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "Bollinger multiplier must be finite and >= 0, got {k}"
        )));
    }
    let middle = simple_moving_average(closes, window)?;
    let std = rolling_std(closes, window)?;

    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());
    let mut aligned_middle = Vec::with_capacity(middle.len());
    for (mid, sd) in middle.into_iter().zip(std) {
        match (mid, sd) {
            (Some(mid), Some(sd)) => {
                upper.push(Some(mid + k * sd));
                aligned_middle.push(Some(mid));
                lower.push(Some(mid - k * sd));
            }
            _ => {
                upper.push(None);
                aligned_middle.push(None);
                lower.push(None);
            }
        }
    }

    Ok(BollingerBands {
        upper,
        middle: aligned_middle,
        lower,
    })
}
