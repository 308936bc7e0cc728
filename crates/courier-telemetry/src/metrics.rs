//! Prometheus metrics for the gateway, dispatcher and command routers.
//!
//! All metrics follow the naming convention: `courier_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // GATEWAY
    // =========================================================================

    /// HTTP requests by route and status code
    pub static ref HTTP_REQUESTS: IntCounterVec = IntCounterVec::new(
        Opts::new("courier_gateway_http_requests_total", "HTTP requests handled by the gateway"),
        &["route", "status"]
    ).expect("metric creation failed");

    /// HTTP request latency by route
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "courier_gateway_http_request_duration_seconds",
            "End-to-end HTTP request latency"
        ).buckets(exponential_buckets(0.0005, 2.0, 16).expect("bucket creation failed")),
        &["route"]
    ).expect("metric creation failed");

    /// Requests refused before dispatch
    pub static ref ACCESS_DENIED: IntCounterVec = IntCounterVec::new(
        Opts::new("courier_gateway_access_denied_total", "Requests refused by identity or access checks"),
        &["reason"]  // reason: unauthorized/forbidden
    ).expect("metric creation failed");

    // =========================================================================
    // DISPATCHER
    // =========================================================================

    /// Dispatcher calls by target service and outcome
    pub static ref DISPATCH_CALLS: IntCounterVec = IntCounterVec::new(
        Opts::new("courier_dispatcher_calls_total", "Commands dispatched over the queue"),
        &["service", "outcome"]  // outcome: reply/timeout/transport_error
    ).expect("metric creation failed");

    /// Time from publish to correlated reply
    pub static ref DISPATCH_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "courier_dispatcher_call_duration_seconds",
            "Time from publish to correlated reply"
        ).buckets(exponential_buckets(0.0005, 2.0, 16).expect("bucket creation failed")),
        &["service"]
    ).expect("metric creation failed");

    /// Calls currently awaiting a reply
    pub static ref PENDING_CALLS: IntGauge = IntGauge::new(
        "courier_dispatcher_pending_calls",
        "Calls currently awaiting a correlated reply"
    ).expect("metric creation failed");

    // =========================================================================
    // COMMAND ROUTER
    // =========================================================================

    /// Deliveries settled by service and outcome
    pub static ref ROUTER_DELIVERIES: IntCounterVec = IntCounterVec::new(
        Opts::new("courier_router_deliveries_total", "Queue deliveries handled by command routers"),
        &["service", "outcome"]  // outcome: ok/rejected/malformed/unknown_command/panicked
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Gateway
        Box::new(HTTP_REQUESTS.clone()),
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(ACCESS_DENIED.clone()),
        // Dispatcher
        Box::new(DISPATCH_CALLS.clone()),
        Box::new(DISPATCH_DURATION.clone()),
        Box::new(PENDING_CALLS.clone()),
        // Router
        Box::new(ROUTER_DELIVERIES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
