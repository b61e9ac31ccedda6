//! General-purpose application metrics sharing the error counter's prefix.

use super::metric_name;
use metrics::Unit;
use std::time::Duration;

const BYTES_PER_MIB: f64 = 1_048_576.0;

/// Handles to the host application's request, payload, push and
/// multipurpose metrics.
#[derive(Debug, Clone)]
pub struct AppMetrics {
    response_time: String,
    requests: String,
    payload: String,
    multipurpose_counter: String,
    push_time: String,
    multipurpose_gauge: String,
}

impl AppMetrics {
    /// Creates the metric names and registers their descriptions with the
    /// installed recorder.
    pub fn new(namespace: &str, subsystem: &str) -> Self {
        let name = |suffix: &str| metric_name(namespace, subsystem, suffix);
        let this = Self {
            response_time: name("http_response_time_seconds"),
            requests: name("http_requests_total"),
            payload: name("http_requests_payload_mib"),
            multipurpose_counter: name("multipurpose_total"),
            push_time: name("push_time_seconds"),
            multipurpose_gauge: name("multipurpose_gauge"),
        };

        metrics::describe_histogram!(this.response_time.clone(), Unit::Seconds, "Duration of HTTP responses by method, path, query and status code.");
        metrics::describe_counter!(this.requests.clone(), Unit::Count, "Count of HTTP requests received by handler.");
        metrics::describe_gauge!(this.payload.clone(), Unit::Mebibytes, "Volume of HTTP request bodies received by handler.");
        metrics::describe_counter!(this.multipurpose_counter.clone(), "Multipurpose counter, labelled by type.");
        metrics::describe_histogram!(this.push_time.clone(), Unit::Seconds, "Duration of queue pushes by address and topic.");
        metrics::describe_gauge!(this.multipurpose_gauge.clone(), "Multipurpose gauge, labelled by type.");

        this
    }

    pub fn inc_request(&self, method: &str, path: &str) {
        metrics::counter!(self.requests.clone(), "method" => method.to_string(), "path" => path.to_string())
            .increment(1);
    }

    pub fn observe_response(&self, method: &str, path: &str, query: &str, code: u16, duration: Duration) {
        metrics::histogram!(
            self.response_time.clone(),
            "method" => method.to_string(),
            "path" => path.to_string(),
            "query" => query.to_string(),
            "code" => code.to_string()
        )
        .record(duration.as_secs_f64());
    }

    /// Records a request body size, in MiB.
    pub fn add_payload(&self, method: &str, path: &str, bytes: usize) {
        // Counters only take integers, so the fractional total lives in a gauge.
        metrics::gauge!(self.payload.clone(), "method" => method.to_string(), "path" => path.to_string())
            .increment(bytes as f64 / BYTES_PER_MIB);
    }

    pub fn inc_counter(&self, kind: &str) {
        metrics::counter!(self.multipurpose_counter.clone(), "type" => kind.to_string()).increment(1);
    }

    pub fn add_counter(&self, kind: &str, value: u64) {
        metrics::counter!(self.multipurpose_counter.clone(), "type" => kind.to_string()).increment(value);
    }

    pub fn observe_push(&self, address: &str, topic: &str, duration: Duration) {
        metrics::histogram!(self.push_time.clone(), "address" => address.to_string(), "topic" => topic.to_string())
            .record(duration.as_secs_f64());
    }

    pub fn inc_gauge(&self, kind: &str) {
        self.gauge(kind).increment(1.0);
    }

    pub fn add_gauge(&self, kind: &str, value: f64) {
        self.gauge(kind).increment(value);
    }

    pub fn dec_gauge(&self, kind: &str) {
        self.gauge(kind).decrement(1.0);
    }

    pub fn sub_gauge(&self, kind: &str, value: f64) {
        self.gauge(kind).decrement(value);
    }

    pub fn set_gauge(&self, kind: &str, value: f64) {
        self.gauge(kind).set(value);
    }

    fn gauge(&self, kind: &str) -> metrics::Gauge {
        metrics::gauge!(self.multipurpose_gauge.clone(), "type" => kind.to_string())
    }
}
