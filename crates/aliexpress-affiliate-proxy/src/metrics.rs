//! Prometheus metrics for the affiliate proxy.
//!
//! Tracks upstream calls, mock fallbacks, and HTTP API traffic.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// HTTP API requests served
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "affiliate_http_requests_total",
        "Total number of HTTP API requests served",
        &["route", "status"]
    )
    .unwrap();

    /// Upstream calls by outcome
    pub static ref UPSTREAM_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "affiliate_upstream_requests_total",
        "Total number of calls made to the affiliate API",
        &["method", "result"]  // result: success|network|timeout|http_status|decode|envelope
    )
    .unwrap();

    /// Upstream call duration
    pub static ref UPSTREAM_REQUEST_DURATION_MS: HistogramVec = register_histogram_vec!(
        "affiliate_upstream_request_duration_ms",
        "Duration of affiliate API calls in milliseconds",
        &["method"],
        vec![10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap();

    /// Responses answered with generated data
    pub static ref MOCK_RESPONSES_TOTAL: CounterVec = register_counter_vec!(
        "affiliate_mock_responses_total",
        "Total number of responses served from generated mock data",
        &["capability", "cause"]  // cause: forced|configuration|upstream
    )
    .unwrap();
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

pub fn record_http_request(route: &str, status: u16) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[route, &status.to_string()])
        .inc();
}

pub fn record_upstream_call(method: &str, result: &str, duration_ms: f64) {
    UPSTREAM_REQUESTS_TOTAL
        .with_label_values(&[method, result])
        .inc();
    UPSTREAM_REQUEST_DURATION_MS
        .with_label_values(&[method])
        .observe(duration_ms);
}

pub fn record_mock_response(capability: &str, cause: &str) {
    MOCK_RESPONSES_TOTAL
        .with_label_values(&[capability, cause])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        record_http_request("/api/categories", 200);
        record_upstream_call("aliexpress.affiliate.category.get", "success", 12.0);
        record_mock_response("categories", "forced");

        let metrics = collect_metrics();
        assert!(metrics.contains("affiliate_http_requests_total"));
        assert!(metrics.contains("affiliate_upstream_requests_total"));
        assert!(metrics.contains("affiliate_upstream_request_duration_ms"));
        assert!(metrics.contains("affiliate_mock_responses_total"));
    }

    #[test]
    fn test_upstream_failure_labels() {
        record_upstream_call("aliexpress.affiliate.product.query", "timeout", 10000.0);
        let metrics = collect_metrics();
        assert!(metrics.contains("result=\"timeout\""));
    }
}
