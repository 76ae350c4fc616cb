use std::io::Write;

use anyhow::{Context, Result};

use sandbox_ta::config::Config;
use sandbox_ta::pipeline;
use sandbox_ta::report::Report;

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    // stdout carries the report, so logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn write_report(config: &Config, report: &Report) -> Result<()> {
    let mut out: Box<dyn Write> = match &config.output.path {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    if config.output.pretty {
        serde_json::to_writer_pretty(&mut out, report)?;
    } else {
        serde_json::to_writer(&mut out, report)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set SANDBOX_TA_CONFIG or provide config/default.toml");
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::info!(
        symbol = %config.data.symbol,
        path = %config.data.path.display(),
        interval = %config.aggregation.interval,
        "Starting sandbox-ta"
    );

    let report = pipeline::run(config.clone()).await?;
    write_report(&config, &report)?;

    tracing::info!(
        candles = report.series.len(),
        columns = report.latest.values.len(),
        destination = %config
            .output
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdout".to_string()),
        "Report written"
    );
    Ok(())
}
