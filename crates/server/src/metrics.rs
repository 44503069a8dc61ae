//! Prometheus request metrics.
//!
//! # Metric Specification
//!
//! - `petcare_request_total{method,endpoint,status}` - Counter of handled requests
//! - `petcare_request_latency_seconds{method,endpoint}` - Histogram of handler latency
//!
//! `endpoint` is the matched route template (e.g. `/api/v1/pets/{id}`), or
//! `unmatched` for requests that hit the fallback, so label cardinality stays
//! bounded.
//!
//! Only label sets produced by real requests are exported. A family with no
//! observations yet is left out of the exposition entirely, so a scrape of a
//! freshly started server shows neither metric until its first response has
//! been recorded.

use std::time::Duration;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Endpoint label used when no route matched.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

/// Prometheus registry and the request metrics registered in it.
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_latency: HistogramVec,
}

impl Metrics {
    /// Create a registry and register the request metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric cannot be registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("petcare_request_total", "Total HTTP requests handled"),
            &["method", "endpoint", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_latency = HistogramVec::new(
            HistogramOpts::new(
                "petcare_request_latency_seconds",
                "HTTP request latency in seconds",
            ),
            &["method", "endpoint"],
        )?;
        registry.register(Box::new(request_latency.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_latency,
        })
    }

    /// Record one handled request.
    pub fn observe(&self, method: &str, endpoint: &str, status: u16, elapsed: Duration) {
        let status = status.to_string();
        self.requests_total
            .with_label_values(&[method, endpoint, status.as_str()])
            .inc();
        self.request_latency
            .with_label_values(&[method, endpoint])
            .observe(elapsed.as_secs_f64());
    }

    /// Render all metrics in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}
