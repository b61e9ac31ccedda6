//! Destinations for rendered log lines.

use chrono::Local;
use std::io::{self, Write};

/// Accepts a fully rendered, possibly color-escaped line.
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Writes lines to stderr behind a local `YYYY/MM/DD HH:MM:SS` timestamp.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ConsoleSink {
    fn timestamped(line: &str) -> String {
        let mut out = format!("{} {}", Local::now().format("%Y/%m/%d %H:%M:%S"), line);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        let out = Self::timestamped(line);
        // A closed stderr has nowhere left to report to.
        let _ = io::stderr().lock().write_all(out.as_bytes());
    }
}
