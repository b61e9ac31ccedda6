//! Command-Line Interface (CLI) argument parsing.
//!
//! The arguments select one record to emit and may override parts of the
//! configuration. Overrides are merged on top of the file and environment by
//! implementing `figment::Provider`.

use crate::level::Level;
use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Emit one log record through the logging and alert pipelines.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Capacity of the logging queue (0 logs synchronously).
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Enable alert forwarding for the emitted level.
    #[arg(long)]
    pub alert: bool,

    /// printf-style format string; the arguments are interpolated into it.
    #[arg(short, long, value_name = "FMT")]
    pub format: Option<String>,

    /// Severity of the record: info, warn, crit, panic or fatal.
    pub level: Level,

    /// Values to log.
    pub args: Vec<String>,
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(capacity) = self.queue_capacity {
            let mut logging = Dict::new();
            logging.insert("queue_capacity".into(), Value::from(capacity as u64));
            dict.insert("logging".into(), Value::from(logging));
        }

        if self.alert {
            let mut routing = Dict::new();
            routing.insert("alerts_enabled".into(), Value::from(true));
            routing.insert(routing_key(self.level).into(), Value::from(true));
            dict.insert("routing".into(), Value::from(routing));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}

fn routing_key(level: Level) -> &'static str {
    match level {
        Level::Info => "info",
        Level::Warn => "warn",
        Level::Critical => "critical",
        Level::Panic => "panic",
        Level::Fatal => "fatal",
    }
}
