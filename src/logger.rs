//! The logging pipeline.
//!
//! A `Logger` works with zero setup: until `start` is called every record is
//! processed on the calling thread. After `start`, records go through a
//! bounded queue to a single consumer thread, and producers block while the
//! queue is full.
//!
//! `Panic` and `Fatal` records never enter the queue. They close and drain
//! it, count the error, push their alert and stop the alert pipeline, and
//! only then unwind or exit the process.

use crate::config::{Config, RoutingConfig};
use crate::error::LogError;
use crate::internal_metrics::{ErrorMetrics, PrometheusErrorMetrics};
use crate::level::Level;
use crate::notification::{AlertSender, ReqwestTransport};
use crate::record::{LogRecord, Origin};
use crate::routing::SeverityRouting;
use crate::sink::{ConsoleSink, LogSink};
use crate::worker::{PipelineState, QueueWorker};
use std::fmt::Display;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info};

/// Everything a record needs once it has been captured.
struct Dispatch {
    sink: Arc<dyn LogSink>,
    routing: SeverityRouting,
    error_metrics: Option<Arc<dyn ErrorMetrics>>,
    alerts: Option<AlertSender>,
}

impl Dispatch {
    fn process(&self, record: LogRecord) {
        let rendered = record.render();
        self.sink.write_line(&record.level.colorize(&rendered));

        if record.level != Level::Info {
            self.record_error(record.level);
        }
        if let Some(alerts) = self.alerting() {
            if self.routing.alert_level(record.level) {
                alerts.enqueue(record.alert_text(&rendered));
            }
        }
    }

    fn record_error(&self, level: Level) {
        if !self.routing.metrics_enabled() {
            return;
        }
        if let Some(metrics) = &self.error_metrics {
            metrics.increment_error(level);
        }
    }

    fn alerting(&self) -> Option<&AlertSender> {
        self.alerts.as_ref().filter(|_| self.routing.alerts_enabled())
    }
}

struct Shared {
    dispatch: Arc<Dispatch>,
    processor: OnceLock<QueueWorker<LogRecord>>,
    // Serializes concurrent panic/fatal records.
    terminal: Mutex<()>,
}

/// A cloneable handle to one logging pipeline.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Logger {
    /// A synchronous logger writing to stderr, with no metrics or alerts.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Builds a logger from configuration.
    ///
    /// Starts the alert pipeline when `[telegram]` is present and the logging
    /// pipeline when `logging.queue_capacity` is non-zero.
    pub fn from_config(config: &Config) -> Result<Self, LogError> {
        let mut builder = Self::builder().routing(&config.routing);

        if config.metrics.enabled {
            builder = builder.error_metrics(PrometheusErrorMetrics::new(
                &config.metrics.namespace,
                &config.metrics.subsystem,
            ));
        }

        if let Some(telegram) = &config.telegram {
            let transport = ReqwestTransport::new(format!("{}-telegram", config.metrics.subsystem));
            builder = builder.alerts(AlertSender::start(telegram, Arc::new(transport))?);
        }

        let logger = builder.build();
        if config.logging.queue_capacity > 0 {
            logger.start(config.logging.queue_capacity)?;
        }
        Ok(logger)
    }

    /// Starts the consumer thread. A logger can be started once.
    pub fn start(&self, capacity: usize) -> Result<(), LogError> {
        if self.shared.processor.get().is_some() {
            return Err(LogError::AlreadyRunning);
        }
        let dispatch = self.shared.dispatch.clone();
        let worker = QueueWorker::spawn("alertlog-log", capacity, move |record: LogRecord| {
            dispatch.process(record)
        })?;

        self.shared.processor.set(worker).map_err(|spare| {
            spare.stop();
            LogError::AlreadyRunning
        })?;
        info!(capacity, "Log processor started.");
        Ok(())
    }

    /// Closes the queue and waits until every record queued so far has been
    /// processed. No-op if the logger was never started.
    pub fn stop(&self) {
        if let Some(worker) = self.shared.processor.get() {
            worker.stop();
        }
    }

    /// Stops the logging pipeline, then the alert pipeline.
    pub fn shutdown(&self) {
        self.stop();
        if let Some(alerts) = &self.shared.dispatch.alerts {
            alerts.stop();
        }
    }

    /// State of the logging pipeline, `None` if it was never started.
    pub fn state(&self) -> Option<PipelineState> {
        self.shared.processor.get().map(QueueWorker::state)
    }

    /// State of the alert pipeline, `None` if none is configured.
    pub fn alerts_state(&self) -> Option<PipelineState> {
        self.shared.dispatch.alerts.as_ref().map(AlertSender::state)
    }

    /// Runtime toggles for metrics and alert routing.
    pub fn routing(&self) -> &SeverityRouting {
        &self.shared.dispatch.routing
    }

    /// Logs the arguments separated by spaces.
    ///
    /// Terminal levels do not return: see `panic` and `fatal`.
    #[track_caller]
    pub fn log(&self, level: Level, args: &[&dyn Display]) {
        self.submit(LogRecord::new(level, Origin::caller(), args));
    }

    /// Logs a printf-style format string.
    #[track_caller]
    pub fn logf(&self, level: Level, format: &str, args: &[&dyn Display]) {
        self.submit(LogRecord::formatted(level, Origin::caller(), format, args));
    }

    #[track_caller]
    pub fn info(&self, args: &[&dyn Display]) {
        self.log(Level::Info, args);
    }

    #[track_caller]
    pub fn infof(&self, format: &str, args: &[&dyn Display]) {
        self.logf(Level::Info, format, args);
    }

    #[track_caller]
    pub fn warn(&self, args: &[&dyn Display]) {
        self.log(Level::Warn, args);
    }

    #[track_caller]
    pub fn warnf(&self, format: &str, args: &[&dyn Display]) {
        self.logf(Level::Warn, format, args);
    }

    #[track_caller]
    pub fn crit(&self, args: &[&dyn Display]) {
        self.log(Level::Critical, args);
    }

    #[track_caller]
    pub fn critf(&self, format: &str, args: &[&dyn Display]) {
        self.logf(Level::Critical, format, args);
    }

    /// Flushes, then panics with the colorized message.
    #[track_caller]
    pub fn panic(&self, args: &[&dyn Display]) -> ! {
        self.terminate(LogRecord::new(Level::Panic, Origin::caller(), args))
    }

    #[track_caller]
    pub fn panicf(&self, format: &str, args: &[&dyn Display]) -> ! {
        self.terminate(LogRecord::formatted(Level::Panic, Origin::caller(), format, args))
    }

    /// Flushes, writes the colorized message and exits with status 1.
    #[track_caller]
    pub fn fatal(&self, args: &[&dyn Display]) -> ! {
        self.terminate(LogRecord::new(Level::Fatal, Origin::caller(), args))
    }

    #[track_caller]
    pub fn fatalf(&self, format: &str, args: &[&dyn Display]) -> ! {
        self.terminate(LogRecord::formatted(Level::Fatal, Origin::caller(), format, args))
    }

    #[track_caller]
    fn submit(&self, record: LogRecord) {
        if record.level.is_terminal() {
            self.terminate(record);
        }
        let Some(worker) = self.shared.processor.get() else {
            self.shared.dispatch.process(record);
            return;
        };
        // A closed queue hands the record back. Submitting after `stop` is
        // a caller error, but the record is still written.
        if let Err(record) = worker.submit(record) {
            debug!("Log processor closed, processing record inline.");
            self.shared.dispatch.process(record);
        }
    }

    #[track_caller]
    fn terminate(&self, record: LogRecord) -> ! {
        let level = record.level;
        let message = self.flush_terminal(&record);
        if level == Level::Fatal {
            self.shared.dispatch.sink.write_line(&message);
            std::process::exit(1);
        }
        panic!("{message}");
    }

    /// Everything a terminal record does before the process stops. Returns
    /// the colorized message.
    pub(crate) fn flush_terminal(&self, record: &LogRecord) -> String {
        let _guard = self
            .shared
            .terminal
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let dispatch = &self.shared.dispatch;

        if let Some(worker) = self.shared.processor.get() {
            worker.stop();
        }
        dispatch.record_error(record.level);

        let rendered = record.render();
        if let Some(alerts) = dispatch.alerting() {
            // A later terminal record finds the pipeline stopped and is
            // delivered on this thread instead.
            if dispatch.routing.alert_level(record.level) {
                alerts.enqueue_or_deliver(record.alert_text(&rendered));
            }
            alerts.stop();
        }
        record.level.colorize(&rendered)
    }
}

/// Builder for `Logger`.
///
/// Metrics are enabled when error metrics are supplied; alerting is enabled
/// when an alert sender is supplied, unless the routing config turns it off.
pub struct LoggerBuilder {
    sink: Arc<dyn LogSink>,
    error_metrics: Option<Arc<dyn ErrorMetrics>>,
    alerts: Option<AlertSender>,
    alerts_enabled: bool,
    routing: SeverityRouting,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            sink: Arc::new(ConsoleSink),
            error_metrics: None,
            alerts: None,
            alerts_enabled: true,
            routing: SeverityRouting::new(),
        }
    }

    pub fn sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn error_metrics(mut self, metrics: impl ErrorMetrics + 'static) -> Self {
        self.error_metrics = Some(Arc::new(metrics));
        self
    }

    pub fn alerts(mut self, sender: AlertSender) -> Self {
        self.alerts = Some(sender);
        self
    }

    /// Forward records of `level` to the alert pipeline.
    pub fn alert_level(self, level: Level, enabled: bool) -> Self {
        self.routing.set_alert_level(level, enabled);
        self
    }

    /// Applies the master alert switch and turns on every level the config
    /// enables. Levels already enabled with `alert_level` stay enabled.
    pub fn routing(mut self, config: &RoutingConfig) -> Self {
        self.alerts_enabled = config.alerts_enabled;
        self.routing.enable_from(config);
        self
    }

    pub fn build(self) -> Logger {
        let routing = self.routing;
        routing.set_metrics_enabled(self.error_metrics.is_some());
        routing.set_alerts_enabled(self.alerts_enabled && self.alerts.is_some());

        Logger {
            shared: Arc::new(Shared {
                dispatch: Arc::new(Dispatch {
                    sink: self.sink,
                    routing,
                    error_metrics: self.error_metrics,
                    alerts: self.alerts,
                }),
                processor: OnceLock::new(),
                terminal: Mutex::new(()),
            }),
        }
    }
}
