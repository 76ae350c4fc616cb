use anyhow::{Context, Result};

use crate::aggregator::CandleAggregator;
use crate::config::Config;
use crate::indicator::order_block::order_blocks;
use crate::indicator::IndicatorEngine;
use crate::loader::load_ticks;
use crate::model::tick::Tick;
use crate::report::Report;
use crate::window::trailing;

/// Aggregate, window and annotate `ticks` as configured, then evaluate the configured conditions.
pub fn build_report(config: &Config, ticks: &[Tick]) -> Result<Report> {
    let aggregator = CandleAggregator::new(config.aggregation.bucket()?)?;
    let series = aggregator.aggregate_series(config.data.symbol.clone(), ticks)?;
    tracing::info!(
        ticks = ticks.len(),
        candles = series.len(),
        interval = %config.aggregation.interval,
        "Aggregated candles"
    );

    let mut windowed = trailing(&series, config.window.lookback()?)
        .context("cannot window an empty series")?;
    tracing::info!(
        candles = windowed.len(),
        lookback = %config.window.lookback,
        "Selected trailing window"
    );

    let engine = IndicatorEngine::new(config.indicators.clone())?;
    engine.annotate_parallel(&mut windowed)?;
    let blocks = order_blocks(windowed.candles(), config.indicators.order_block_window)?;

    let report = Report::build(
        config.aggregation.interval.clone(),
        config.data.path.display().to_string(),
        windowed,
        &config.conditions,
        &blocks,
    )?;
    for cond in report.conditions.iter().filter(|c| c.triggered) {
        tracing::info!(condition = %cond.condition, "Condition triggered on latest candle");
    }
    Ok(report)
}

/// Load the configured CSV and build the report off the async runtime.
pub async fn run(config: Config) -> Result<Report> {
    tokio::task::spawn_blocking(move || {
        let load = load_ticks(&config.data.path)?;
        build_report(&config, &load.ticks)
    })
    .await
    .context("report task panicked")?
}
