//! Configuration management for alertlog
//!
//! This module defines the main `Config` struct and its sub-structs. It uses
//! the `figment` crate to layer defaults, an optional TOML file, environment
//! variables prefixed with `ALERTLOG_` and command-line overrides.

use crate::cli::Cli;
use crate::error::LogError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// The main configuration struct.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Filter for the crate's own diagnostics (tracing `EnvFilter` syntax).
    pub log_level: String,
    /// The logging pipeline.
    pub logging: LoggingConfig,
    /// Error metrics and the Prometheus exporter.
    pub metrics: MetricsConfig,
    /// Which levels are forwarded to the alert pipeline.
    pub routing: RoutingConfig,
    /// Telegram alert delivery. Absent means no alert pipeline.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

/// Configuration for the logging pipeline.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Capacity of the record queue. 0 keeps logging synchronous.
    pub queue_capacity: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
        }
    }
}

/// Configuration for error metrics.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Count non-informational records by level.
    pub enabled: bool,
    pub namespace: String,
    pub subsystem: String,
    /// Serve a Prometheus scrape endpoint on this address.
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: "app".to_string(),
            subsystem: "alertlog".to_string(),
            listen_address: None,
        }
    }
}

/// Alert routing toggles, one per level plus the master switch.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RoutingConfig {
    pub alerts_enabled: bool,
    pub info: bool,
    pub warn: bool,
    pub critical: bool,
    pub panic: bool,
    pub fatal: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            info: false,
            warn: false,
            critical: false,
            panic: false,
            fatal: false,
        }
    }
}

/// Credentials and queue settings for Telegram delivery.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub thread_id: String,
    #[serde(default = "default_alert_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_alert_queue_capacity() -> usize {
    256
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
            routing: RoutingConfig::default(),
            telegram: None,
        }
    }
}

impl Config {
    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }
        // e.g. ALERTLOG_LOGGING__QUEUE_CAPACITY=16
        figment.merge(Env::prefixed("ALERTLOG_").split("__"))
    }

    /// Loads defaults, the optional TOML file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self, LogError> {
        Ok(Self::figment(config_path).extract()?)
    }

    /// Like `load`, with command-line overrides applied last.
    pub fn load_from_cli(cli: &Cli) -> Result<Self, LogError> {
        Ok(Self::figment(cli.config.as_deref()).merge(cli).extract()?)
    }
}
