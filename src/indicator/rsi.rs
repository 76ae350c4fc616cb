use crate::error::{EngineError, EngineResult};

use super::stats::simple_moving_average;

pub const DEFAULT_RSI_WINDOW: usize = 14;

/// RSI from simple averages of gains and losses over `window` deltas.
///
/// The first `window` positions are absent. A window without gains and without losses
/// has no defined strength and is absent too; a window without losses reads 100.
pub fn rsi(closes: &[Option<f64>], window: usize) -> EngineResult<Vec<Option<f64>>> {
    if closes.is_empty() {
        return Err(EngineError::InsufficientData);
    }

    let deltas: Vec<Option<f64>> = std::iter::once(None)
        .chain(closes.windows(2).map(|w| match (w[0], w[1]) {
            (Some(prev), Some(cur)) => Some(cur - prev),
            _ => None,
        }))
        .collect();
    let gains: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| d.max(0.0))).collect();
    let losses: Vec<Option<f64>> = deltas.iter().map(|d| d.map(|d| (-d).max(0.0))).collect();

    let avg_gain = simple_moving_average(&gains, window)?;
    let avg_loss = simple_moving_average(&losses, window)?;

    Ok(avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(gain, loss)| rsi_from_averages(gain?, loss?))
        .collect())
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
