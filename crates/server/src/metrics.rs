//! Prometheus metrics for the HTTP entry point.
//!
//! This module provides metrics for:
//! - HTTP requests (latency, counts, in flight)
//! - `/generate` invocations by result and their duration
//!
//! Pipeline stage metrics live in the core crate and are recorded by the
//! pipeline process itself.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "quotereel_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("quotereel_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "quotereel_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Generate Metrics
// =============================================================================

/// Pipeline subprocess invocations by result.
pub static GENERATE_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quotereel_generate_invocations_total",
            "Pipeline runs started through /generate",
        ),
        &["result"], // "success", "error", "spawn_failed"
    )
    .unwrap()
});

/// Wall time of a pipeline subprocess.
pub static GENERATE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "quotereel_generate_duration_seconds",
            "Duration of a pipeline subprocess",
        )
        .buckets(vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(GENERATE_INVOCATIONS.clone()))
        .unwrap();
    registry
        .register(Box::new(GENERATE_DURATION.clone()))
        .unwrap();
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    encode_registry(&REGISTRY)
}

/// Encode the metrics of `registry` in Prometheus text format.
pub fn encode_registry(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Routes served by this process; anything else is folded into one label.
const KNOWN_PATHS: &[&str] = &["/", "/health", "/config", "/generate", "/metrics"];

/// Map a request path to a bounded metric label.
pub fn normalize_path(path: &str) -> String {
    let trimmed = match path.trim_end_matches('/') {
        "" => "/",
        p => p,
    };
    if KNOWN_PATHS.contains(&trimmed) {
        trimmed.to_string()
    } else {
        "other".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_known_paths() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/generate"), "/generate");
        assert_eq!(normalize_path("/health/"), "/health");
    }

    #[test]
    fn test_normalize_unknown_path() {
        assert_eq!(normalize_path("/wp-admin/login.php"), "other");
    }

    #[test]
    fn test_encode_includes_generate_counter() {
        GENERATE_INVOCATIONS.with_label_values(&["success"]).inc_by(0);
        let text = encode_metrics().unwrap();
        assert!(text.contains("quotereel_generate_invocations_total"));
    }
}
