use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::condition::Condition;
use crate::indicator::IndicatorConfig;
use crate::window::Lookback;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "SANDBOX_TA_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub aggregation: AggregationConfig,
    pub window: WindowConfig,
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub path: PathBuf,
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationConfig {
    pub interval: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub lookback: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Report destination; stdout when unset.
    pub path: Option<PathBuf>,
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            pretty: default_pretty(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Parse an interval string (e.g. "1s", "1m", "1h", "1d", "1w", "1M") into seconds.
/// "M" counts 30 days.
pub fn parse_interval_secs(s: &str) -> Result<i64> {
    if s.len() < 2 {
        bail!("invalid interval '{}': expected format like '1h'", s);
    }

    let (num_str, suffix) = s.split_at(s.len() - 1);
    let n: i64 = num_str.parse().with_context(|| {
        format!(
            "invalid interval '{}': quantity must be a positive integer",
            s
        )
    })?;
    if n <= 0 {
        bail!("invalid interval '{}': quantity must be > 0", s);
    }

    let unit_secs = match suffix {
        "s" => 1,
        "m" => 60,
        "h" => 3_600,
        "d" => 86_400,
        "w" => 7 * 86_400,
        "M" => 30 * 86_400,
        _ => bail!(
            "invalid interval '{}': unsupported suffix '{}', expected one of s/m/h/d/w/M",
            s,
            suffix
        ),
    };

    n.checked_mul(unit_secs)
        .filter(|secs| Duration::try_seconds(*secs).is_some())
        .with_context(|| format!("invalid interval '{}': value is too large", s))
}

/// Parse a trailing-window length: calendar "1y" / "6mo", or any interval string.
pub fn parse_lookback(s: &str) -> Result<Lookback> {
    let s = s.trim();
    let calendar = |num: &str| -> Result<u32> {
        let n: u32 = num
            .parse()
            .with_context(|| format!("invalid lookback '{}': quantity must be a positive integer", s))?;
        if n == 0 {
            bail!("invalid lookback '{}': quantity must be > 0", s);
        }
        Ok(n)
    };
    if let Some(num) = s.strip_suffix("mo") {
        return Ok(Lookback::Months(calendar(num)?));
    }
    if let Some(num) = s.strip_suffix('y') {
        return Ok(Lookback::Years(calendar(num)?));
    }
    let secs = parse_interval_secs(s).with_context(|| format!("invalid lookback '{}'", s))?;
    Ok(Lookback::Span(Duration::seconds(secs)))
}

impl AggregationConfig {
    pub fn bucket(&self) -> Result<Duration> {
        Ok(Duration::seconds(parse_interval_secs(&self.interval)?))
    }
}

impl WindowConfig {
    pub fn lookback(&self) -> Result<Lookback> {
        parse_lookback(&self.lookback)
    }
}

impl Config {
    /// Load from `$SANDBOX_TA_CONFIG` (or `config/default.toml`), after reading `.env`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("invalid config TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.symbol.trim().is_empty() {
            bail!("data.symbol must not be empty");
        }
        self.aggregation
            .bucket()
            .context("aggregation.interval is invalid")?;
        self.window.lookback().context("window.lookback is invalid")?;
        self.indicators
            .validate()
            .context("indicators section is invalid")?;
        Ok(())
    }
}
