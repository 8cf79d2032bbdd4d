use std::sync::LazyLock;

use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

pub static QUERIES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "rag_queries_total",
        "Queries handled, by outcome",
        &["outcome"]
    )
    .expect("rag_queries_total registers once")
});

pub static STAGE_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "rag_stage_duration_seconds",
        "Latency of each upstream call in the query pipeline",
        &["stage"]
    )
    .expect("rag_stage_duration_seconds registers once")
});

pub fn record_outcome(outcome: &str) {
    QUERIES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Renders the default registry in the Prometheus text format.
pub fn render() -> (Vec<u8>, String) {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    (buffer, encoder.format_type().to_string())
}
