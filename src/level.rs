//! Severity levels and their presentation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// The severity of a log record.
///
/// Levels are not ranked: each one selects a handling policy (metrics, alert
/// routing, and whether the process survives the record).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warn,
    Critical,
    Panic,
    Fatal,
}

impl Level {
    /// All levels, in declaration order.
    pub const ALL: [Level; 5] = [
        Level::Info,
        Level::Warn,
        Level::Critical,
        Level::Panic,
        Level::Fatal,
    ];

    /// The label used in alert prefixes and metric labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Critical => "CRIT",
            Level::Panic => "PANIC",
            Level::Fatal => "FATAL",
        }
    }

    /// Returns true for levels that halt the caller after flushing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Level::Panic | Level::Fatal)
    }

    /// Wraps `message` in the ANSI color for this level.
    pub fn colorize(&self, message: &str) -> String {
        let color = match self {
            Level::Info => return message.to_string(),
            Level::Warn => YELLOW,
            Level::Critical => RED,
            Level::Panic => CYAN,
            Level::Fatal => MAGENTA,
        };
        format!("{color}{message}{RESET}")
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a level.
#[derive(Debug, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" | "log" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "crit" | "critical" => Ok(Level::Critical),
            "panic" => Ok(Level::Panic),
            "fatal" => Ok(Level::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
