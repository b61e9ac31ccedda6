//! alertlog - emit one record through the logging and alert pipelines.

use alertlog::{
    cli::Cli,
    config::Config,
    internal_metrics::MetricsBuilder,
    Logger,
};
use anyhow::Result;
use clap::Parser;
use std::fmt::Display;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = Config::load_from_cli(&cli).unwrap_or_else(|err| {
        tracing_subscriber::fmt().with_writer(std::io::stderr).init();
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(
        queue_capacity = config.logging.queue_capacity,
        metrics = config.metrics.enabled,
        telegram = config.telegram.is_some(),
        "alertlog starting up"
    );

    MetricsBuilder::new(config.metrics.clone()).install()?;
    let logger = Logger::from_config(&config)?;

    let args: Vec<&dyn Display> = cli.args.iter().map(|a| a as &dyn Display).collect();
    match &cli.format {
        Some(format) => logger.logf(cli.level, format, &args),
        None => logger.log(cli.level, &args),
    }

    logger.shutdown();
    Ok(())
}
