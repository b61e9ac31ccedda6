//! The HTTP seam used to deliver alerts.

use anyhow::Context;
use std::sync::OnceLock;
use std::time::Duration;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A blocking request/response function with a per-request timeout.
pub trait HttpTransport: Send + Sync {
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
        timeout: Duration,
    ) -> anyhow::Result<HttpResponse>;
}

/// `HttpTransport` backed by a blocking `reqwest` client.
///
/// The client is built on first use, which happens on the alert worker thread.
/// A blocking client must not be created from inside an async runtime.
#[derive(Debug)]
pub struct ReqwestTransport {
    user_agent: String,
    client: OnceLock<reqwest::blocking::Client>,
}

impl ReqwestTransport {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            client: OnceLock::new(),
        }
    }

    fn client(&self) -> anyhow::Result<&reqwest::blocking::Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(self.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl HttpTransport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
        timeout: Duration,
    ) -> anyhow::Result<HttpResponse> {
        let mut request = self.client()?.post(url).timeout(timeout).body(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
