use chrono::{DateTime, Duration};
use sandbox_ta::config::Config;
use sandbox_ta::indicator::engine::{MACD, RSI};
use sandbox_ta::model::tick::Tick;
use sandbox_ta::pipeline::{build_report, run};

fn config(data_path: &str, lookback: &str) -> Config {
    Config::from_toml_str(&format!(
        r#"
[data]
path = "{data_path}"
symbol = "BTCUSD"

[aggregation]
interval = "1h"

[window]
lookback = "{lookback}"

[indicators]
ma_windows = [5, 10]

[[conditions]]
indicator = "RSI"
action = "Above 70"

[[conditions]]
indicator = "10MA"
action = "Below Price"

[logging]
level = "info"
"#
    ))
    .unwrap()
}

/// One tick per minute for `hours` hours from an hour boundary, trending up with a wobble.
fn minute_ticks(hours: i64) -> Vec<Tick> {
    let start = DateTime::from_timestamp(1_599_998_400, 0).unwrap();
    (0..hours * 60)
        .map(|m| {
            let price = 100.0 + m as f64 * 0.01 + ((m % 13) as f64 - 6.0) * 0.05;
            Tick {
                timestamp: start + Duration::minutes(m),
                open: price,
                high: price + 0.02,
                low: price - 0.02,
                close: price,
                volume_base: 1.0,
                volume_quote: price,
            }
        })
        .collect()
}

#[test]
fn builds_hourly_report_over_trailing_window() {
    let cfg = config("unused.csv", "24h");
    let report = build_report(&cfg, &minute_ticks(72)).unwrap();

    assert_eq!(report.symbol, "BTCUSD");
    assert_eq!(report.interval, "1h");
    // 72 hourly buckets, the last 25 fall within 24h of the latest inclusive
    assert_eq!(report.series.len(), 25);
    for c in report.series.candles() {
        assert_eq!(c.tick_count, 60);
        assert!((c.volume - 60.0).abs() < 1e-9);
    }
    assert!(report.latest.values.contains_key(RSI));
    assert!(report.latest.values.contains_key("MA_10"));
    assert!(report.latest.values.get(MACD).unwrap().is_some());
    assert_eq!(report.conditions.len(), 2);
    // rising trend: MA_10 sits below the latest close
    assert!(report.conditions[1].triggered);
}

#[test]
fn report_serializes_to_json() {
    let cfg = config("unused.csv", "1y");
    let report = build_report(&cfg, &minute_ticks(30)).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["symbol"], "BTCUSD");
    assert_eq!(json["generated_from"], "unused.csv");
    assert_eq!(json["series"]["candles"].as_array().unwrap().len(), 30);
    // absent warm-up values serialize as null rather than a number
    assert!(json["series"]["columns"]["MA_10"][0].is_null());
}

#[test]
fn empty_history_fails() {
    let cfg = config("unused.csv", "1y");
    assert!(build_report(&cfg, &[]).is_err());
}

#[tokio::test]
async fn runs_from_csv_file() {
    let path = std::env::temp_dir().join(format!("sandbox-ta-pipeline-{}.csv", std::process::id()));
    let mut csv = String::from("Timestamp,Open,High,Low,Close,Volume_(BTC),Volume_(Currency),Weighted_Price\n");
    for tick in minute_ticks(10) {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            tick.timestamp.timestamp(),
            tick.open,
            tick.high,
            tick.low,
            tick.close,
            tick.volume_base,
            tick.volume_quote,
            tick.close
        ));
    }
    std::fs::write(&path, csv).unwrap();

    let report = run(config(path.to_str().unwrap(), "1y")).await;
    std::fs::remove_file(&path).ok();
    let report = report.unwrap();
    assert_eq!(report.series.len(), 10);
    assert_eq!(report.generated_from, path.display().to_string());
}

#[test]
fn missing_csv_surfaces_error() {
    let cfg = config("/no/such/history.csv", "1y");
    let err = tokio_test::block_on(run(cfg)).unwrap_err();
    assert!(format!("{:#}", err).contains("/no/such/history.csv"));
}
