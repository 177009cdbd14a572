use prometheus::{IntCounterVec, Opts};

use super::{error::MetricsError, registry::MetricRegistry};

pub const REQUESTS_TOTAL: &str = "requests_total";
pub const REQUESTS_ERROR_TOTAL: &str = "requests_error_total";
pub const REQUEST_LABELS: [&str; 3] = ["method", "path", "status"];

/// Status recorded when a request is torn down before a response exists
pub const TEARDOWN_STATUS: u16 = 0;

/// Success/error request counters labeled by (method, path, status).
///
/// `path` must be a route template. Series are created on first use; the
/// underlying metric vector does the get-or-insert under its own lock, so
/// concurrent first observations of a label tuple share one series.
#[derive(Clone)]
pub struct RequestCounters {
    success: IntCounterVec,
    error: IntCounterVec,
}

impl RequestCounters {
    /// Create both counters and register them with `registry`
    pub fn register(registry: &MetricRegistry) -> Result<Self, MetricsError> {
        let success = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, "Total number of HTTP requests"),
            &REQUEST_LABELS,
        )?;
        let error = IntCounterVec::new(
            Opts::new(REQUESTS_ERROR_TOTAL, "Total number of HTTP request errors"),
            &REQUEST_LABELS,
        )?;

        registry.register(Box::new(success.clone()))?;
        registry.register(Box::new(error.clone()))?;

        Ok(Self { success, error })
    }

    /// Count one completed request
    pub fn observe(&self, method: &str, path: &str, status: u16) {
        let status_code = status.to_string();
        let counter = if is_success(status) {
            &self.success
        } else {
            &self.error
        };
        counter
            .with_label_values(&[method, path, status_code.as_str()])
            .inc();
    }
}

/// Below 400 is success; the teardown sentinel never is
pub fn is_success(status: u16) -> bool {
    status != TEARDOWN_STATUS && status < 400
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MetricRegistry, RequestCounters) {
        let registry = MetricRegistry::new(None).unwrap();
        let counters = RequestCounters::register(&registry).unwrap();
        (registry, counters)
    }

    #[test]
    fn test_classification() {
        assert!(is_success(200));
        assert!(is_success(304));
        assert!(is_success(399));
        assert!(!is_success(400));
        assert!(!is_success(404));
        assert!(!is_success(500));
        assert!(!is_success(TEARDOWN_STATUS));
    }

    #[test]
    fn test_success_goes_to_requests_total() {
        let (registry, counters) = setup();
        counters.observe("GET", "/v1/users", 200);

        let labels = [("method", "GET"), ("path", "/v1/users"), ("status", "200")];
        assert_eq!(registry.counter_value(REQUESTS_TOTAL, &labels), 1.0);
        assert_eq!(registry.counter_value(REQUESTS_ERROR_TOTAL, &labels), 0.0);
    }

    #[test]
    fn test_error_goes_to_requests_error_total() {
        let (registry, counters) = setup();
        counters.observe("GET", "/v1/users", 200);
        counters.observe("GET", "/v1/users", 500);

        assert_eq!(
            registry.counter_value(
                REQUESTS_ERROR_TOTAL,
                &[("path", "/v1/users"), ("status", "500")]
            ),
            1.0
        );
        // The success series is untouched by the error
        assert_eq!(
            registry.counter_value(REQUESTS_TOTAL, &[("path", "/v1/users")]),
            1.0
        );
    }

    #[test]
    fn test_teardown_sentinel_is_an_error() {
        let (registry, counters) = setup();
        counters.observe("GET", "/v1/compute", TEARDOWN_STATUS);

        assert_eq!(
            registry.counter_value(REQUESTS_ERROR_TOTAL, &[("status", "0")]),
            1.0
        );
        assert_eq!(registry.counter_value(REQUESTS_TOTAL, &[]), 0.0);
    }

    #[test]
    fn test_registering_twice_fails() {
        let (registry, _counters) = setup();
        assert!(matches!(
            RequestCounters::register(&registry),
            Err(MetricsError::DuplicateMetricName { .. })
        ));
    }

    #[test]
    fn test_concurrent_first_observation_creates_one_series() {
        let (registry, counters) = setup();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let counters = counters.clone();
                scope.spawn(move || {
                    for _ in 0..1000 {
                        counters.observe("GET", "/v1/new", 200);
                    }
                });
            }
        });

        let series: Vec<_> = registry
            .collect()
            .filter(|s| s.name == REQUESTS_TOTAL && s.label("path") == Some("/v1/new"))
            .collect();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].value, 8000.0);
    }
}
