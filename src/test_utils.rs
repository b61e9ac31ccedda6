//! In-memory collaborators for tests.

use crate::internal_metrics::ErrorMetrics;
use crate::level::Level;
use crate::notification::transport::{HttpResponse, HttpTransport};
use crate::sink::LogSink;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A sink that records every line it is given.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for CaptureSink {
    fn write_line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

/// Error metrics that remember the levels they were incremented for.
#[derive(Debug, Clone, Default)]
pub struct RecordingErrorMetrics {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl RecordingErrorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> Vec<Level> {
        self.levels.lock().unwrap().clone()
    }

    pub fn count(&self, level: Level) -> usize {
        self.levels.lock().unwrap().iter().filter(|l| **l == level).count()
    }
}

impl ErrorMetrics for RecordingErrorMetrics {
    fn increment_error(&self, level: Level) {
        self.levels.lock().unwrap().push(level);
    }
}

/// One request seen by `MockTransport`.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
}

impl RecordedCall {
    /// The decoded `text` form field of the body.
    pub fn text(&self) -> String {
        form_urlencoded::parse(&self.body)
            .find(|(key, _)| key == "text")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Status(u16),
    Error(String),
}

/// A transport that records requests and answers with a fixed reply,
/// optionally after a delay.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: Reply,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub fn with_status(status: u16) -> Self {
        Self {
            reply: Reply::Status(status),
            delay: Duration::ZERO,
            calls: Arc::default(),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Error(message.to_string()),
            ..Self::with_status(0)
        }
    }

    /// Sleeps for `delay` before replying to each request.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl HttpTransport for MockTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
        timeout: Duration,
    ) -> anyhow::Result<HttpResponse> {
        std::thread::sleep(self.delay);
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body,
            timeout,
        });
        match &self.reply {
            Reply::Status(status) => Ok(HttpResponse {
                status: *status,
                body: Vec::new(),
            }),
            Reply::Error(message) => Err(anyhow::anyhow!("{}", message)),
        }
    }
}
