//! Metrics collection and exposition.
//!
//! # Metrics
//! - `annotation_http_requests_total` (counter): requests by method, route, status
//! - `annotation_http_request_duration_seconds` (histogram): latency distribution
//! - `annotation_session_rejections_total` (counter): requests halted by the session gate
//! - `annotation_annotations_stored_total` (counter): accepted annotations
//! - `annotation_sessions_active` (gauge): sessions currently held in the store
//!
//! Without an installed recorder every call below is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("annotation_http_requests_total", &labels).increment(1);
    histogram!("annotation_http_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_session_rejected(reason: &'static str) {
    counter!("annotation_session_rejections_total", "reason" => reason).increment(1);
}

pub fn record_annotations_stored(count: usize) {
    counter!("annotation_annotations_stored_total").increment(count as u64);
}

pub fn record_active_sessions(count: usize) {
    gauge!("annotation_sessions_active").set(count as f64);
}

/// Request metrics keyed by the matched route template, not the raw path.
pub async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &route, response.status().as_u16(), start);
    response
}
