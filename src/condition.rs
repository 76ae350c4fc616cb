use std::fmt;

use serde::Deserialize;

use crate::error::EngineError;
use crate::indicator::engine::{ma_column, BB_LOWER, BB_UPPER, MACD, RSI, SIGNAL};
use crate::model::series::Series;

/// Indicator/action rule as written in config, e.g. `{ indicator = "RSI", action = "Above 70" }`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionSpec {
    pub indicator: String,
    pub action: String,
}

/// A rule evaluated against an annotated series at one position.
///
/// Rules that need a missing column or an absent value never hold.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "ConditionSpec")]
pub enum Condition {
    RsiAbove(f64),
    RsiBelow(f64),
    MacdAboveZero,
    MacdBelowZero,
    MacdCrossAbove,
    MacdCrossBelow,
    MaAbovePrice(usize),
    MaBelowPrice(usize),
    MaPctAbove(usize, f64),
    MaPctBelow(usize, f64),
    GoldenCross { fast: usize, slow: usize },
    DeathCross { fast: usize, slow: usize },
    BollingerReachTop,
    BollingerReachBottom,
}

const GOLDEN_CROSS_FAST: usize = 50;

fn parse_number(s: &str, spec: &ConditionSpec) -> Result<f64, EngineError> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| unknown(spec))
}

fn unknown(spec: &ConditionSpec) -> EngineError {
    EngineError::InvalidInput(format!(
        "unsupported condition '{}' / '{}'",
        spec.indicator, spec.action
    ))
}

impl TryFrom<ConditionSpec> for Condition {
    type Error = EngineError;

    fn try_from(spec: ConditionSpec) -> Result<Self, Self::Error> {
        let indicator = spec.indicator.trim().to_ascii_lowercase();
        let action = spec.action.trim().to_ascii_lowercase();

        if indicator == "rsi" {
            if let Some(th) = action.strip_prefix("above ") {
                return Ok(Condition::RsiAbove(parse_number(th, &spec)?));
            }
            if let Some(th) = action.strip_prefix("below ") {
                return Ok(Condition::RsiBelow(parse_number(th, &spec)?));
            }
            return Err(unknown(&spec));
        }

        if indicator == "macd" {
            return match action.as_str() {
                "above 0" => Ok(Condition::MacdAboveZero),
                "below 0" => Ok(Condition::MacdBelowZero),
                "cross above" => Ok(Condition::MacdCrossAbove),
                "cross below" => Ok(Condition::MacdCrossBelow),
                _ => Err(unknown(&spec)),
            };
        }

        if indicator == "bollinger band" || indicator == "bollinger" {
            return match action.as_str() {
                "reach top" | "top" => Ok(Condition::BollingerReachTop),
                "reach bottom" | "bottom" => Ok(Condition::BollingerReachBottom),
                _ => Err(unknown(&spec)),
            };
        }

        // "200MA", "100ma", "MA_50"
        let window = indicator
            .strip_suffix("ma")
            .or_else(|| indicator.strip_prefix("ma_"))
            .and_then(|w| w.trim().parse::<usize>().ok())
            .filter(|w| *w > 0)
            .ok_or_else(|| unknown(&spec))?;

        let cross_slow = || {
            if window > GOLDEN_CROSS_FAST {
                Ok(window)
            } else {
                Err(EngineError::InvalidInput(format!(
                    "'{}' / '{}': cross needs a slow MA longer than MA_{GOLDEN_CROSS_FAST}",
                    spec.indicator, spec.action
                )))
            }
        };

        match action.as_str() {
            "above price" => Ok(Condition::MaAbovePrice(window)),
            "below price" => Ok(Condition::MaBelowPrice(window)),
            "golden cross" => Ok(Condition::GoldenCross {
                fast: GOLDEN_CROSS_FAST,
                slow: cross_slow()?,
            }),
            "death cross" => Ok(Condition::DeathCross {
                fast: GOLDEN_CROSS_FAST,
                slow: cross_slow()?,
            }),
            _ => {
                if let Some(pct) = action.strip_suffix("% above line") {
                    Ok(Condition::MaPctAbove(window, parse_number(pct, &spec)?))
                } else if let Some(pct) = action.strip_suffix("% below line") {
                    Ok(Condition::MaPctBelow(window, parse_number(pct, &spec)?))
                } else {
                    Err(unknown(&spec))
                }
            }
        }
    }
}

fn crossed_above(series: &Series, a: &str, b: &str, i: usize) -> bool {
    if i == 0 {
        return false;
    }
    match (
        series.value(a, i - 1),
        series.value(b, i - 1),
        series.value(a, i),
        series.value(b, i),
    ) {
        (Some(pa), Some(pb), Some(ca), Some(cb)) => pa <= pb && ca > cb,
        _ => false,
    }
}

impl Condition {
    pub fn holds_at(&self, series: &Series, i: usize) -> bool {
        let Some(candle) = series.candles().get(i) else {
            return false;
        };
        let close = candle.close;
        let value = |name: &str| series.value(name, i);

        match *self {
            Condition::RsiAbove(th) => value(RSI).is_some_and(|r| r > th),
            Condition::RsiBelow(th) => value(RSI).is_some_and(|r| r < th),
            Condition::MacdAboveZero => value(MACD).is_some_and(|m| m > 0.0),
            Condition::MacdBelowZero => value(MACD).is_some_and(|m| m < 0.0),
            Condition::MacdCrossAbove => crossed_above(series, MACD, SIGNAL, i),
            Condition::MacdCrossBelow => crossed_above(series, SIGNAL, MACD, i),
            Condition::MaAbovePrice(w) => value(&ma_column(w)).is_some_and(|ma| ma > close),
            Condition::MaBelowPrice(w) => value(&ma_column(w)).is_some_and(|ma| ma < close),
            Condition::MaPctAbove(w, pct) => {
                value(&ma_column(w)).is_some_and(|ma| close >= ma * (1.0 + pct / 100.0))
            }
            Condition::MaPctBelow(w, pct) => {
                value(&ma_column(w)).is_some_and(|ma| close <= ma * (1.0 - pct / 100.0))
            }
            Condition::GoldenCross { fast, slow } => {
                crossed_above(series, &ma_column(fast), &ma_column(slow), i)
            }
            Condition::DeathCross { fast, slow } => {
                crossed_above(series, &ma_column(slow), &ma_column(fast), i)
            }
            Condition::BollingerReachTop => value(BB_UPPER).is_some_and(|u| candle.high >= u),
            Condition::BollingerReachBottom => value(BB_LOWER).is_some_and(|l| candle.low <= l),
        }
    }

    pub fn holds_latest(&self, series: &Series) -> bool {
        series
            .len()
            .checked_sub(1)
            .is_some_and(|i| self.holds_at(series, i))
    }

    /// Every position where the rule holds.
    pub fn hits(&self, series: &Series) -> Vec<usize> {
        (0..series.len()).filter(|&i| self.holds_at(series, i)).collect()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::RsiAbove(th) => write!(f, "RSI above {th}"),
            Condition::RsiBelow(th) => write!(f, "RSI below {th}"),
            Condition::MacdAboveZero => write!(f, "MACD above 0"),
            Condition::MacdBelowZero => write!(f, "MACD below 0"),
            Condition::MacdCrossAbove => write!(f, "MACD cross above signal"),
            Condition::MacdCrossBelow => write!(f, "MACD cross below signal"),
            Condition::MaAbovePrice(w) => write!(f, "MA_{w} above price"),
            Condition::MaBelowPrice(w) => write!(f, "MA_{w} below price"),
            Condition::MaPctAbove(w, pct) => write!(f, "price {pct}% above MA_{w}"),
            Condition::MaPctBelow(w, pct) => write!(f, "price {pct}% below MA_{w}"),
            Condition::GoldenCross { fast, slow } => write!(f, "golden cross MA_{fast}/MA_{slow}"),
            Condition::DeathCross { fast, slow } => write!(f, "death cross MA_{fast}/MA_{slow}"),
            Condition::BollingerReachTop => write!(f, "Bollinger reach top"),
            Condition::BollingerReachBottom => write!(f, "Bollinger reach bottom"),
        }
    }
}
