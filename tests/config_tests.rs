use chrono::Duration;
use sandbox_ta::condition::Condition;
use sandbox_ta::config::{parse_interval_secs, parse_lookback, Config};
use sandbox_ta::window::Lookback;

const FULL: &str = r#"
[data]
path = "data/bitstampUSD_1-min_data.csv"
symbol = "BTCUSD"

[aggregation]
interval = "1h"

[window]
lookback = "1y"

[indicators]
rsi_window = 14
ma_windows = [50, 100, 200]
bollinger_window = 20
bollinger_k = 2.0
macd_fast = 12
macd_slow = 26
macd_signal = 9

[[conditions]]
indicator = "RSI"
action = "Above 70"

[[conditions]]
indicator = "MACD"
action = "Cross below"

[output]
path = "report.json"
pretty = false

[logging]
level = "debug"
json = true
"#;

#[test]
fn parse_full_toml() {
    let config = Config::from_toml_str(FULL).unwrap();
    assert_eq!(config.data.symbol, "BTCUSD");
    assert_eq!(config.aggregation.bucket().unwrap(), Duration::hours(1));
    assert_eq!(config.window.lookback().unwrap(), Lookback::Years(1));
    assert_eq!(config.indicators.ma_windows, vec![50, 100, 200]);
    assert_eq!(config.indicators.order_block_window, 14);
    assert!((config.indicators.bollinger_k - 2.0).abs() < f64::EPSILON);
    assert_eq!(
        config.conditions,
        vec![Condition::RsiAbove(70.0), Condition::MacdCrossBelow]
    );
    assert_eq!(
        config.output.path.as_deref(),
        Some(std::path::Path::new("report.json"))
    );
    assert!(!config.output.pretty);
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
}

#[test]
fn optional_sections_default() {
    let toml_str = r#"
[data]
path = "ticks.csv"
symbol = "ETHUSD"

[aggregation]
interval = "15m"

[window]
lookback = "30d"

[logging]
level = "info"
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.indicators.rsi_window, 14);
    assert_eq!(config.indicators.macd_slow, 26);
    assert!(config.conditions.is_empty());
    assert!(config.output.path.is_none());
    assert!(config.output.pretty);
    assert!(!config.logging.json);
}

#[test]
fn invalid_sections_are_rejected() {
    let bad_interval = FULL.replace("interval = \"1h\"", "interval = \"0h\"");
    assert!(Config::from_toml_str(&bad_interval).is_err());

    let bad_lookback = FULL.replace("lookback = \"1y\"", "lookback = \"forever\"");
    assert!(Config::from_toml_str(&bad_lookback).is_err());

    let bad_macd = FULL.replace("macd_fast = 12", "macd_fast = 40");
    assert!(Config::from_toml_str(&bad_macd).is_err());

    let bad_condition = FULL.replace("action = \"Above 70\"", "action = \"Above\"");
    assert!(Config::from_toml_str(&bad_condition).is_err());

    let flat_cross = FULL.replace(
        "indicator = \"MACD\"\naction = \"Cross below\"",
        "indicator = \"50MA\"\naction = \"Golden Cross\"",
    );
    assert_ne!(flat_cross, FULL);
    assert!(Config::from_toml_str(&flat_cross).is_err());
}

#[test]
fn parse_interval_valid() {
    assert_eq!(parse_interval_secs("1m").unwrap(), 60);
    assert_eq!(parse_interval_secs("4h").unwrap(), 14_400);
    assert_eq!(parse_interval_secs("1w").unwrap(), 604_800);
}

#[test]
fn parse_interval_rejects_invalid_inputs() {
    assert!(parse_interval_secs("").is_err());
    assert!(parse_interval_secs("h").is_err());
    assert!(parse_interval_secs("0m").is_err());
    assert!(parse_interval_secs("1x").is_err());
}

#[test]
fn parse_lookback_variants() {
    assert_eq!(parse_lookback("2y").unwrap(), Lookback::Years(2));
    assert_eq!(parse_lookback("3mo").unwrap(), Lookback::Months(3));
    assert_eq!(
        parse_lookback("12h").unwrap(),
        Lookback::Span(Duration::hours(12))
    );
}

#[test]
fn shipped_default_config_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let config = Config::from_path(&path).unwrap();
    assert_eq!(config.data.symbol, "BTCUSD");
    assert_eq!(config.window.lookback().unwrap(), Lookback::Years(1));
}
