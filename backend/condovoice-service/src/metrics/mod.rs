//! Prometheus metrics for condovoice-service.
//!
//! Collectors register with the default registry; `serve_metrics` renders
//! everything gathered there, including the db-pool gauges.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    /// Requests served, by method, matched route pattern and status code.
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "condovoice_http_requests_total",
        "Total HTTP requests segmented by method, route and status",
        &["method", "route", "status"]
    )
    .expect("failed to register condovoice_http_requests_total");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "condovoice_http_request_duration_seconds",
        "HTTP request duration segmented by method and route",
        &["method", "route"]
    )
    .expect("failed to register condovoice_http_request_duration_seconds");

    /// Like toggles by resulting action (liked/unliked).
    pub static ref LIKE_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "condovoice_like_toggles_total",
        "Like toggles segmented by resulting action",
        &["action"]
    )
    .expect("failed to register condovoice_like_toggles_total");

    /// Poll votes by outcome (recorded/duplicate/rejected).
    pub static ref POLL_VOTES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "condovoice_poll_votes_total",
        "Poll vote requests segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register condovoice_poll_votes_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
