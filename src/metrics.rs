//! Prometheus metrics for the backend.
//!
//! Tracks database connection attempts, query latency, created users and
//! served HTTP requests.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Database connection attempts counter metric name.
pub const METRIC_DB_CONNECT_ATTEMPTS: &str = "db_connect_attempts_total";
/// Database connection failures counter metric name.
pub const METRIC_DB_CONNECT_FAILURES: &str = "db_connect_failures_total";
/// Database query latency metric name.
pub const METRIC_DB_QUERY_LATENCY: &str = "db_query_latency_ms";
/// Users created counter metric name.
pub const METRIC_USERS_CREATED: &str = "users_created_total";
/// HTTP requests counter metric name.
pub const METRIC_HTTP_REQUESTS: &str = "http_requests_total";

/// Install the Prometheus recorder and return the render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_DB_CONNECT_ATTEMPTS,
        "Total number of database connection attempts"
    );
    describe_counter!(
        METRIC_DB_CONNECT_FAILURES,
        "Total number of failed database connection attempts"
    );
    describe_histogram!(
        METRIC_DB_QUERY_LATENCY,
        "Database query latency in milliseconds"
    );
    describe_counter!(METRIC_USERS_CREATED, "Total number of users created");
    describe_counter!(METRIC_HTTP_REQUESTS, "Total number of HTTP requests served");

    debug!("Metrics initialized");
}

/// Increment connection attempts counter.
pub fn inc_db_connect_attempts() {
    counter!(METRIC_DB_CONNECT_ATTEMPTS).increment(1);
}

/// Increment connection failures counter.
pub fn inc_db_connect_failures() {
    counter!(METRIC_DB_CONNECT_FAILURES).increment(1);
}

/// Record database query latency.
pub fn record_db_query_latency(start: Instant, query: &'static str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_DB_QUERY_LATENCY, "query" => query).record(latency_ms);
}

/// Increment users created counter.
pub fn inc_users_created() {
    counter!(METRIC_USERS_CREATED).increment(1);
}

/// Increment HTTP requests counter.
pub fn inc_http_requests(method: &str, status: u16) {
    counter!(
        METRIC_HTTP_REQUESTS,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// RAII guard for timing queries.
/// Automatically records latency when dropped.
pub struct QueryTimer {
    start: Instant,
    query: &'static str,
}

impl QueryTimer {
    /// Start timing the named query.
    pub fn new(query: &'static str) -> Self {
        Self {
            start: Instant::now(),
            query,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for QueryTimer {
    fn drop(&mut self) {
        record_db_query_latency(self.start, self.query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn query_timer_measures_time() {
        let timer = QueryTimer::new("test_query");
        sleep(Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 9.0);
    }
}
