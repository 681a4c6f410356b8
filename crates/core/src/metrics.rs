//! Prometheus metrics for pipeline runs.
//!
//! This module provides metrics for:
//! - Pipeline runs by outcome
//! - Per-stage durations (queue, image, composite, render, publish, write-back)
//! - Upstream retries by operation

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Pipeline runs by outcome.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("quotereel_pipeline_runs_total", "Total pipeline runs"),
        &["outcome"], // "completed", "nothing_to_do", "failed"
    )
    .unwrap()
});

/// Duration of each pipeline stage in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "quotereel_stage_duration_seconds",
            "Duration of a pipeline stage",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["stage"],
    )
    .unwrap()
});

/// Retries issued against upstream services.
pub static UPSTREAM_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "quotereel_upstream_retries_total",
            "Retries issued against upstream services",
        ),
        &["operation"],
    )
    .unwrap()
});

/// All core metrics, for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_RUNS.clone()),
        Box::new(STAGE_DURATION.clone()),
        Box::new(UPSTREAM_RETRIES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        PIPELINE_RUNS.with_label_values(&["completed"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "quotereel_pipeline_runs_total"));
    }
}
