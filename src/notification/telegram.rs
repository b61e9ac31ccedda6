//! Best-effort alert delivery to a Telegram chat thread.

use crate::config::TelegramConfig;
use crate::error::{DeliveryError, LogError};
use crate::notification::transport::HttpTransport;
use crate::worker::{PipelineState, QueueWorker};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Upper bound on a single delivery attempt.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Formats and posts one alert to the Bot API `sendMessage` method.
pub struct TelegramClient {
    url: String,
    chat_id: String,
    thread_id: String,
    transport: Arc<dyn HttpTransport>,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            url: format!(
                "{}/bot{}/sendMessage",
                config.api_base_url.trim_end_matches('/'),
                config.token
            ),
            chat_id: config.chat_id.clone(),
            thread_id: config.thread_id.clone(),
            transport,
        }
    }

    /// The form body for `text`. Only the text is urlencoded.
    pub fn form_body(&self, text: &str) -> String {
        let text: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
        format!(
            "chat_id={}&message_thread_id={}&text={}",
            self.chat_id, self.thread_id, text
        )
    }

    /// Makes exactly one delivery attempt. Success is status 200 and nothing else.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn send(&self, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .transport
            .post(
                &self.url,
                &[("Content-Type", "application/x-www-form-urlencoded")],
                self.form_body(text).into_bytes(),
                DELIVERY_TIMEOUT,
            )
            .map_err(|e| DeliveryError::Transport(format!("{e:#}")))?;

        if response.status != 200 {
            return Err(DeliveryError::Status(response.status));
        }
        debug!("Alert delivered.");
        Ok(())
    }
}

/// The alert pipeline: a bounded queue of alert texts and the worker that
/// delivers them one at a time.
pub struct AlertSender {
    client: Arc<TelegramClient>,
    worker: QueueWorker<String>,
}

fn deliver(client: &TelegramClient, text: &str) {
    if let Err(e) = client.send(text) {
        error!(error = %e, "[TG FAIL] Failed to deliver alert");
    }
}

impl AlertSender {
    /// Starts the alert worker.
    pub fn start(config: &TelegramConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, LogError> {
        let client = Arc::new(TelegramClient::new(config, transport));
        let worker_client = client.clone();
        let worker = QueueWorker::spawn("alertlog-alert", config.queue_capacity, move |text: String| {
            deliver(&worker_client, &text)
        })?;
        Ok(Self { client, worker })
    }

    /// Queues an alert, blocking while the queue is full.
    ///
    /// Returns false, after logging it locally, if the pipeline has already
    /// been stopped.
    pub fn enqueue(&self, text: String) -> bool {
        match self.worker.submit(text) {
            Ok(()) => true,
            Err(text) => {
                warn!(alert = %text.trim_end(), "Alert pipeline is closed, alert not queued");
                false
            }
        }
    }

    /// Queues an alert, or makes its one delivery attempt on the calling
    /// thread when the pipeline has already been stopped.
    ///
    /// Used for alerts that must be attempted before the process goes away.
    pub fn enqueue_or_deliver(&self, text: String) {
        if let Err(text) = self.worker.submit(text) {
            debug!("Alert pipeline is closed, delivering inline.");
            deliver(&self.client, &text);
        }
    }

    /// Closes the queue and waits until every queued alert has had its one
    /// delivery attempt.
    pub fn stop(&self) {
        self.worker.stop();
    }

    pub fn state(&self) -> PipelineState {
        self.worker.state()
    }
}
