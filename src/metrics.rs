use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> PrometheusHandle {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // Pre-register counters so they appear even before the first increment.
    counter!("predictions_total").absolute(0);
    counter!("predictions_failed").absolute(0);
    counter!("high_risk_total").absolute(0);

    gauge!("ensemble_loaded").set(0.0);

    // Histogram is lazily created on first record; force creation.
    histogram!("predict_latency_seconds").record(0.0);

    handle
}
