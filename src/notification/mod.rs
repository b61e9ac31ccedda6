//! Delivery of high-severity records to an external notification channel.
//!
//! The alert pipeline is independent of the logging pipeline: it has its own
//! queue and worker, and the logger only ever talks to it through
//! `AlertSender::enqueue` and `AlertSender::stop`.
pub mod telegram;
pub mod transport;

pub use telegram::{AlertSender, TelegramClient, DELIVERY_TIMEOUT};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
