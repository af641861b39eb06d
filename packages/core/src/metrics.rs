//! Prometheus metrics registry for the EldaFriend backend.
//!
//! [`AppMetrics`] owns every registered metric and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and share it with
//! the router, the pruner and the notifier.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub struct AppMetrics {
    /// Medicines successfully created.
    pub medicines_created_total: Counter,
    /// Completion flags written through `med-taken`.
    pub completions_marked_total: Counter,
    /// Signups started (OTP issued).
    pub signups_total: Counter,
    /// Notifications the relay failed to deliver.
    pub notification_failures_total: Counter,
    /// Pending signups removed by the pruner.
    pub pending_signups_pruned_total: Counter,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    pub registry: Registry,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let medicines_created_total = Counter::with_opts(Opts::new(
            "eldafriend_medicines_created_total",
            "Medicines created",
        ))?;

        let completions_marked_total = Counter::with_opts(Opts::new(
            "eldafriend_completions_marked_total",
            "Completion flags written",
        ))?;

        let signups_total = Counter::with_opts(Opts::new(
            "eldafriend_signups_total",
            "Signups started",
        ))?;

        let notification_failures_total = Counter::with_opts(Opts::new(
            "eldafriend_notification_failures_total",
            "Notifications that could not be delivered",
        ))?;

        let pending_signups_pruned_total = Counter::with_opts(Opts::new(
            "eldafriend_pending_signups_pruned_total",
            "Expired pending signups removed",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "eldafriend_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "eldafriend_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(medicines_created_total.clone()))?;
        registry.register(Box::new(completions_marked_total.clone()))?;
        registry.register(Box::new(signups_total.clone()))?;
        registry.register(Box::new(notification_failures_total.clone()))?;
        registry.register(Box::new(pending_signups_pruned_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            medicines_created_total,
            completions_marked_total,
            signups_total,
            notification_failures_total,
            pending_signups_pruned_total,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok(), "AppMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn render_contains_every_metric_after_use() {
        let metrics = AppMetrics::new().unwrap();
        metrics.medicines_created_total.inc();
        metrics.completions_marked_total.inc();
        metrics.signups_total.inc();
        metrics.notification_failures_total.inc();
        metrics.pending_signups_pruned_total.inc_by(2.0);
        metrics
            .http_requests_total
            .with_label_values(&["POST", "/api/user/create-med", "201"])
            .inc();
        metrics.http_request_duration.observe(0.02);

        let output = metrics.render().unwrap();
        for name in [
            "eldafriend_medicines_created_total",
            "eldafriend_completions_marked_total",
            "eldafriend_signups_total",
            "eldafriend_notification_failures_total",
            "eldafriend_pending_signups_pruned_total 2",
            "eldafriend_http_requests_total",
            "eldafriend_http_request_duration_seconds",
        ] {
            assert!(output.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn http_requests_counter_vec_labels_work() {
        let metrics = AppMetrics::new().unwrap();
        let labels = ["PATCH", "/api/user/med-taken", "204"];
        metrics.http_requests_total.with_label_values(&labels).inc();
        metrics.http_requests_total.with_label_values(&labels).inc();
        let val = metrics.http_requests_total.with_label_values(&labels).get();
        assert!((val - 2.0).abs() < f64::EPSILON);
    }
}
