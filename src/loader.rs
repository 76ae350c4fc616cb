//! Minute-bar CSV history loading.
//!
//! Supported layouts, detected from the header row (case-insensitive):
//! - Bitstamp: `Timestamp,Open,High,Low,Close,Volume_(BTC),Volume_(Currency),Weighted_Price`
//! - Generic: `timestamp|date|time,open,high,low,close[,volume][,quote_volume]`

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::EngineError;
use crate::model::tick::Tick;

#[derive(Debug, Clone, Default)]
pub struct TickLoad {
    pub ticks: Vec<Tick>,
    /// Rows without prices (minutes with no trades), left out of `ticks`.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume_base: Option<usize>,
    volume_quote: Option<usize>,
}

impl Columns {
    fn detect(headers: &csv::StringRecord) -> Result<Self> {
        let lower: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |pred: &dyn Fn(&str) -> bool| lower.iter().position(|h| pred(h.as_str()));
        let required = |name: &str| {
            find(&|h| h == name).with_context(|| format!("CSV header is missing '{name}' column"))
        };

        let timestamp = find(&|h| matches!(h, "timestamp" | "unix timestamp" | "unix" | "date" | "time"))
            .context("CSV header is missing a timestamp column")?;
        let volume_quote = find(&|h| {
            h == "volume_(currency)" || h == "quote_volume" || h.starts_with("volume usd")
        });
        let volume_base = lower
            .iter()
            .enumerate()
            .find(|(i, h)| h.starts_with("volume") && Some(*i) != volume_quote)
            .map(|(i, _)| i);

        Ok(Self {
            timestamp,
            open: required("open")?,
            high: required("high")?,
            low: required("low")?,
            close: required("close")?,
            volume_base,
            volume_quote,
        })
    }
}

/// Unix seconds (integer or fractional), `YYYY-MM-DD HH:MM:SS`, or RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() && secs.abs() < i64::MAX as f64 {
            return DateTime::from_timestamp(secs.floor() as i64, 0);
        }
        return None;
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn invalid(line: u64, msg: impl std::fmt::Display) -> anyhow::Error {
    EngineError::InvalidInput(format!("line {line}: {msg}")).into()
}

fn field(record: &csv::StringRecord, idx: usize, line: u64, name: &str) -> Result<f64> {
    let raw = record
        .get(idx)
        .ok_or_else(|| invalid(line, format!("missing {name}")))?
        .trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>()
        .map_err(|_| invalid(line, format!("{name} '{raw}' is not a number")))
}

/// Read ticks from any CSV source. Rows whose prices are empty or NaN are skipped;
/// unparseable timestamps, non-numeric fields and timestamps going backwards are errors.
pub fn read_ticks<R: io::Read>(reader: R) -> Result<TickLoad> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::detect(rdr.headers().context("failed to read CSV header")?)?;

    let mut out = TickLoad::default();
    let mut last: Option<DateTime<Utc>> = None;
    for record in rdr.records() {
        let record = record.context("failed to read CSV record")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let raw_ts = record.get(columns.timestamp).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts)
            .ok_or_else(|| invalid(line, format!("unparseable timestamp '{raw_ts}'")))?;
        if let Some(prev) = last {
            if timestamp < prev {
                return Err(invalid(
                    line,
                    format!("timestamp {timestamp} goes back before {prev}"),
                ));
            }
        }
        last = Some(timestamp);

        let open = field(&record, columns.open, line, "open")?;
        let high = field(&record, columns.high, line, "high")?;
        let low = field(&record, columns.low, line, "low")?;
        let close = field(&record, columns.close, line, "close")?;
        if [open, high, low, close].iter().any(|p| p.is_nan()) {
            out.skipped += 1;
            continue;
        }
        if [open, high, low, close].iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Err(invalid(line, "prices must be finite and positive"));
        }

        let volume = |idx: Option<usize>, name: &str| -> Result<f64> {
            let Some(idx) = idx else {
                return Ok(0.0);
            };
            let v = field(&record, idx, line, name)?;
            if v.is_nan() {
                return Ok(0.0);
            }
            if !v.is_finite() || v < 0.0 {
                return Err(invalid(line, format!("{name} must be finite and >= 0")));
            }
            Ok(v)
        };

        out.ticks.push(Tick {
            timestamp,
            open,
            high,
            low,
            close,
            volume_base: volume(columns.volume_base, "base volume")?,
            volume_quote: volume(columns.volume_quote, "quote volume")?,
        });
    }

    tracing::debug!(
        rows = out.ticks.len() + out.skipped,
        skipped = out.skipped,
        "Parsed tick CSV"
    );
    Ok(out)
}

pub fn load_ticks<P: AsRef<Path>>(path: P) -> Result<TickLoad> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let load = read_ticks(io::BufReader::new(file))
        .with_context(|| format!("failed to load ticks from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        ticks = load.ticks.len(),
        skipped = load.skipped,
        "Loaded tick history"
    );
    Ok(load)
}
