use chrono::{DateTime, Duration, Utc};
use sandbox_ta::aggregator::CandleAggregator;
use sandbox_ta::model::tick::Tick;
use sandbox_ta::EngineError;

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn tick(secs: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Tick {
    Tick {
        timestamp: at(secs),
        open,
        high,
        low,
        close,
        volume_base: volume,
        volume_quote: volume * close,
    }
}

fn hourly() -> CandleAggregator {
    CandleAggregator::new(Duration::hours(1)).unwrap()
}

#[test]
fn single_tick_per_bucket_round_trips() {
    let ticks = vec![
        tick(3_600, 10.0, 12.0, 9.0, 11.0, 1.5),
        tick(7_200, 11.0, 11.5, 10.0, 10.5, 2.0),
        tick(18_000, 10.5, 13.0, 10.5, 12.5, 0.0),
    ];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles.len(), 3);
    for (candle, tick) in candles.iter().zip(&ticks) {
        assert_eq!(candle.period_start, tick.timestamp);
        assert_eq!(candle.open, tick.open);
        assert_eq!(candle.high, tick.high);
        assert_eq!(candle.low, tick.low);
        assert_eq!(candle.close, tick.close);
        assert_eq!(candle.volume, tick.volume_base);
        assert_eq!(candle.volume_quote, tick.volume_quote);
        assert_eq!(candle.tick_count, 1);
    }
}

#[test]
fn bucket_takes_first_open_last_close_extremes_and_volume_sum() {
    let ticks = vec![
        tick(3_600, 100.0, 101.0, 99.0, 100.5, 1.0),
        tick(3_660, 100.5, 104.0, 100.0, 103.0, 2.0),
        tick(3_720, 103.0, 103.5, 97.0, 98.0, 0.5),
        tick(7_199, 98.0, 99.0, 97.5, 98.5, 0.25),
    ];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles.len(), 1);
    let c = &candles[0];
    assert_eq!(c.period_start, at(3_600));
    assert!((c.open - 100.0).abs() < f64::EPSILON);
    assert!((c.high - 104.0).abs() < f64::EPSILON);
    assert!((c.low - 97.0).abs() < f64::EPSILON);
    assert!((c.close - 98.5).abs() < f64::EPSILON);
    assert!((c.volume - 3.75).abs() < 1e-12);
    assert_eq!(c.tick_count, 4);
    assert!(c.low <= c.open && c.open <= c.high);
    assert!(c.low <= c.close && c.close <= c.high);
}

#[test]
fn period_start_is_floored_to_bucket() {
    let ticks = vec![tick(5_432, 1.0, 1.0, 1.0, 1.0, 0.0)];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles[0].period_start, at(3_600));
}

#[test]
fn empty_buckets_are_not_synthesized() {
    let ticks = vec![
        tick(0, 1.0, 1.0, 1.0, 1.0, 1.0),
        tick(10 * 3_600 + 5, 2.0, 2.0, 2.0, 2.0, 1.0),
    ];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[1].period_start, at(36_000));
}

#[test]
fn unordered_ticks_are_sorted_before_bucketing() {
    let ticks = vec![
        tick(3_700, 2.0, 2.0, 2.0, 2.0, 1.0),
        tick(3_600, 1.0, 1.0, 1.0, 1.0, 1.0),
        tick(60, 9.0, 9.0, 9.0, 9.0, 1.0),
    ];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].period_start, at(0));
    assert!((candles[1].open - 1.0).abs() < f64::EPSILON);
    assert!((candles[1].close - 2.0).abs() < f64::EPSILON);
}

#[test]
fn duplicate_minutes_are_merged_in_arrival_order() {
    let ticks = vec![
        tick(3_600, 1.0, 1.0, 1.0, 1.0, 1.0),
        tick(3_600, 2.0, 2.0, 2.0, 2.0, 1.0),
    ];
    let candles = hourly().aggregate(&ticks).unwrap();
    assert_eq!(candles.len(), 1);
    assert!((candles[0].open - 1.0).abs() < f64::EPSILON);
    assert!((candles[0].close - 2.0).abs() < f64::EPSILON);
    assert!((candles[0].volume - 2.0).abs() < f64::EPSILON);
}

#[test]
fn rejects_non_finite_prices() {
    let ticks = vec![tick(0, f64::NAN, 1.0, 1.0, 1.0, 1.0)];
    assert!(matches!(
        hourly().aggregate(&ticks),
        Err(EngineError::InvalidInput(_))
    ));
}

#[test]
fn rejects_non_positive_bucket() {
    assert!(matches!(
        CandleAggregator::new(Duration::zero()),
        Err(EngineError::InvalidInput(_))
    ));
}

#[test]
fn empty_input_yields_empty_series() {
    let series = hourly().aggregate_series("BTCUSD", &[]).unwrap();
    assert!(series.is_empty());
    assert_eq!(series.name(), "BTCUSD");
}
