//! Prometheus metrics setup and metric definitions

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering metrics.
pub fn install_prometheus_recorder() -> PrometheusHandle {
    // Prometheus defaults plus sub-millisecond buckets for fast endpoints
    let buckets = vec![
        0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets(&buckets)
        .expect("failed to set histogram buckets")
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Register metric descriptions and emit initial zero values so Prometheus output
/// includes HELP/TYPE lines for all metrics from startup (not just after first use).
pub fn describe_metrics() {
    // HTTP metrics
    describe_counter!("gamesoc_http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "gamesoc_http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_gauge!(
        "gamesoc_http_requests_in_flight",
        "Number of HTTP requests currently being processed"
    );

    // Email metrics
    describe_counter!(
        "gamesoc_email_sends_total",
        "Per-recipient email send attempts by provider and outcome"
    );
    describe_counter!(
        "gamesoc_email_dispatches_total",
        "Completed email dispatches by provider and summary status"
    );
    describe_histogram!(
        "gamesoc_email_dispatch_duration_seconds",
        "Wall time of a whole dispatch batch in seconds"
    );

    // Spreadsheet import
    describe_counter!(
        "gamesoc_sheet_imports_total",
        "Spreadsheet recipient imports by result"
    );

    // Cache
    describe_counter!("gamesoc_cache_lookups_total", "Cache lookups by result");

    counter!("gamesoc_email_sends_total", "provider" => "smtp", "outcome" => "sent").absolute(0);
    counter!("gamesoc_email_dispatches_total", "provider" => "smtp", "status" => "success")
        .absolute(0);
    histogram!("gamesoc_email_dispatch_duration_seconds", "provider" => "smtp").record(0.0);
    counter!("gamesoc_sheet_imports_total", "result" => "ok").absolute(0);
    counter!("gamesoc_cache_lookups_total", "result" => "hit").absolute(0);
    gauge!("gamesoc_http_requests_in_flight").set(0.0);
}

/// Record one per-recipient send attempt.
pub fn record_email_send(provider: &'static str, sent: bool) {
    let outcome = if sent { "sent" } else { "failed" };
    counter!("gamesoc_email_sends_total", "provider" => provider, "outcome" => outcome)
        .increment(1);
}

/// Record a finished dispatch batch.
pub fn record_dispatch(provider: &'static str, status: &'static str, duration_secs: f64) {
    counter!("gamesoc_email_dispatches_total", "provider" => provider, "status" => status)
        .increment(1);
    histogram!("gamesoc_email_dispatch_duration_seconds", "provider" => provider)
        .record(duration_secs);
}

pub fn record_sheet_import(result: &'static str) {
    counter!("gamesoc_sheet_imports_total", "result" => result).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("gamesoc_cache_lookups_total", "result" => result).increment(1);
}
