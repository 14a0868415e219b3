//! Prometheus metrics.
//!
//! Counters are recorded unconditionally; they are only exported when
//! [`init_metrics`] installed a recorder. Without one every call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use nk_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/notes", 201);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Increment passcode dispatch counter.
pub fn otp_sent_total(delivered: bool) {
    metrics::counter!("auth_otp_sent_total",
        "delivered" => delivered.to_string()
    )
    .increment(1);
}

/// Increment sign-in counter.
///
/// `method` is the flow name, `outcome` is `success` or an error label.
pub fn logins_total(method: &'static str, outcome: &'static str) {
    metrics::counter!("auth_logins_total",
        "method" => method,
        "outcome" => outcome
    )
    .increment(1);
}

// ============================================================================
// Note Metrics
// ============================================================================

pub fn notes_created_total() {
    metrics::counter!("notes_created_total").increment(1);
}

pub fn notes_deleted_total() {
    metrics::counter!("notes_deleted_total").increment(1);
}
