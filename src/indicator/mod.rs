pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod order_block;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod std_dev;

pub use engine::{ma_column, IndicatorConfig, IndicatorEngine};
pub use stats::{exponential_moving_average, rolling_std, simple_moving_average};
