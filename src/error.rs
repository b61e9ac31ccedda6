use thiserror::Error;

/// Errors raised while configuring or starting the pipelines.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("log processor already running")]
    AlreadyRunning,

    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,

    #[error("failed to spawn {worker} worker: {source}")]
    Spawn {
        worker: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load configuration: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("failed to install metrics exporter: {0}")]
    MetricsExporter(String),
}

/// A failed alert delivery. Recovered locally by the alert worker.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("code not 200 ({0})")]
    Status(u16),
}

impl From<figment::Error> for LogError {
    fn from(e: figment::Error) -> Self {
        LogError::Config(Box::new(e))
    }
}
