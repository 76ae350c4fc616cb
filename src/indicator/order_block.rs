use crate::error::EngineResult;
use crate::model::candle::Candle;

use super::stats::simple_moving_average;

pub const DEFAULT_ORDER_BLOCK_WINDOW: usize = 14;

/// Positions whose bar range contracts below the rolling mean range right after a bar
/// whose range exceeded that same mean.
pub fn order_blocks(candles: &[Candle], window: usize) -> EngineResult<Vec<usize>> {
    let ranges: Vec<Option<f64>> = candles.iter().map(|c| Some(c.range())).collect();
    let mean_range = simple_moving_average(&ranges, window)?;

    Ok((1..candles.len())
        .filter(|&i| {
            let Some(mean) = mean_range[i] else {
                return false;
            };
            candles[i - 1].range() > mean && candles[i].range() < mean
        })
        .collect())
}
