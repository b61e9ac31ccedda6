/// alertlog - severity-aware logging with best-effort alert delivery
///
/// Records are rendered, colorized and written by a single consumer thread
/// behind a bounded queue. Selected levels are forwarded to a Telegram chat
/// through a second queue, and panic/fatal records flush both pipelines
/// before the process unwinds or exits.
pub mod cli;
pub mod config;
pub mod error;
pub mod internal_metrics;
pub mod level;
pub mod logger;
pub mod notification;
pub mod record;
pub mod routing;
pub mod sink;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export core types for convenience
pub use error::{DeliveryError, LogError};
pub use level::Level;
pub use logger::{Logger, LoggerBuilder};
pub use record::{LogRecord, Origin};
pub use routing::SeverityRouting;
pub use sink::{ConsoleSink, LogSink};
pub use worker::PipelineState;
