use chrono::{DateTime, Duration, Months, Utc};

use crate::error::{EngineError, EngineResult};
use crate::model::series::Series;

/// How far back a trailing window reaches from the latest candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// A fixed span of time.
    Span(Duration),
    /// Calendar months, clamped to the end of shorter months.
    Months(u32),
    /// Calendar years.
    Years(u32),
}

impl Lookback {
    /// Earliest instant still inside the window ending at `latest`.
    pub fn start_from(&self, latest: DateTime<Utc>) -> EngineResult<DateTime<Utc>> {
        let start = match *self {
            Lookback::Span(span) => {
                if span < Duration::zero() {
                    return Err(EngineError::InvalidInput(format!(
                        "lookback span must be >= 0, got {span}"
                    )));
                }
                latest.checked_sub_signed(span)
            }
            Lookback::Months(n) => latest.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => n
                .checked_mul(12)
                .and_then(|m| latest.checked_sub_months(Months::new(m))),
        };
        // Reaching past the representable range means everything is inside the window.
        Ok(start.unwrap_or(DateTime::<Utc>::MIN_UTC))
    }
}

/// Select candles with `period_start` in `[latest - lookback, latest]`, carrying along
/// any columns already computed on the series.
pub fn trailing(series: &Series, lookback: Lookback) -> EngineResult<Series> {
    let latest = series.latest().ok_or(EngineError::EmptySeries)?.period_start;
    let start = lookback.start_from(latest)?;
    let first = series
        .candles()
        .partition_point(|c| c.period_start < start);
    Ok(series.tail_from(first))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn calendar_years_follow_dates() {
        let latest = Utc.with_ymd_and_hms(2021, 3, 31, 0, 0, 0).unwrap();
        let start = Lookback::Years(1).start_from(latest).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2020, 3, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn months_clamp_to_month_end() {
        let latest = Utc.with_ymd_and_hms(2021, 3, 31, 12, 0, 0).unwrap();
        let start = Lookback::Months(1).start_from(latest).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2021, 2, 28, 12, 0, 0).unwrap());
    }

    #[test]
    fn negative_span_is_invalid() {
        let latest = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert!(Lookback::Span(Duration::seconds(-1)).start_from(latest).is_err());
    }
}
