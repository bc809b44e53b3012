//! Analysis client metrics
//!
//! # Metrics
//!
//! - `analysis_requests_total{endpoint, outcome}` - requests by result
//! - `analysis_request_duration_seconds{endpoint}` - round-trip latency
//! - `analysis_requests_in_flight` - requests awaiting a response

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct ClientMetrics {
    /// Requests by endpoint and outcome
    pub requests_total: IntCounterVec,

    /// Request latency by endpoint
    pub request_duration: HistogramVec,

    /// Requests currently awaiting a response
    pub in_flight: IntGauge,

    /// Registry owning the collectors above
    pub registry: Arc<Registry>,
}

impl ClientMetrics {
    /// Create collectors in a fresh registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let requests_total = IntCounterVec::new(
            Opts::new("analysis_requests_total", "Scoring service requests by outcome"),
            &["endpoint", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "analysis_request_duration_seconds",
                "Scoring service round-trip latency",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["endpoint"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let in_flight = IntGauge::new(
            "analysis_requests_in_flight",
            "Scoring service requests awaiting a response",
        )?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            requests_total,
            request_duration,
            in_flight,
            registry,
        })
    }

    /// Count one finished request
    pub fn record(&self, endpoint: &str, outcome: Outcome, elapsed_secs: f64) {
        self.requests_total
            .with_label_values(&[endpoint, outcome.as_str()])
            .inc();
        self.request_duration
            .with_label_values(&[endpoint])
            .observe(elapsed_secs);
    }

    /// Count a request as in flight until the guard is dropped, including
    /// when the request future is dropped before completing
    pub fn track_in_flight(&self) -> InFlightGuard<'_> {
        self.in_flight.inc();
        InFlightGuard(&self.in_flight)
    }

    /// Requests recorded so far for an endpoint/outcome pair
    pub fn count(&self, endpoint: &str, outcome: Outcome) -> u64 {
        self.requests_total
            .with_label_values(&[endpoint, outcome.as_str()])
            .get()
    }

    /// Prometheus text exposition
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Decrements the in-flight gauge on drop
#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a IntGauge);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

impl fmt::Debug for ClientMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientMetrics")
            .field("in_flight", &self.in_flight.get())
            .finish_non_exhaustive()
    }
}

/// Request outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx with a usable body
    Success,
    /// Transport, status or decode failure
    Failure,
    /// Cancelled before completion
    Cancelled,
}

impl Outcome {
    /// Label value
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Cancelled => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_render() {
        let metrics = ClientMetrics::new().unwrap();
        metrics.record("/predict", Outcome::Success, 0.12);
        metrics.record("/predict", Outcome::Failure, 0.3);
        metrics.record("/predict", Outcome::Failure, 0.3);

        assert_eq!(metrics.count("/predict", Outcome::Success), 1);
        assert_eq!(metrics.count("/predict", Outcome::Failure), 2);
        assert_eq!(metrics.count("/explain", Outcome::Success), 0);

        let text = metrics.render().unwrap();
        assert!(text.contains("analysis_requests_total"));
        assert!(text.contains("analysis_request_duration_seconds"));
    }

    #[test]
    fn test_in_flight_guard_releases_on_drop() {
        let metrics = ClientMetrics::new().unwrap();
        {
            let _first = metrics.track_in_flight();
            let _second = metrics.track_in_flight();
            assert_eq!(metrics.in_flight.get(), 2);
        }
        assert_eq!(metrics.in_flight.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        // Separate instances must not collide on registration
        let a = ClientMetrics::new().unwrap();
        let b = ClientMetrics::new().unwrap();
        a.record("/explain", Outcome::Cancelled, 0.0);
        assert_eq!(b.count("/explain", Outcome::Cancelled), 0);
    }
}
