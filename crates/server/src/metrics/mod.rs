pub mod counters;
pub mod error;
pub mod middleware;
pub mod process;
pub mod registry;

pub use counters::{REQUESTS_ERROR_TOTAL, REQUESTS_TOTAL, RequestCounters, TEARDOWN_STATUS};
pub use error::MetricsError;
pub use middleware::{InFlightRequest, RequestObservation, request_metrics_middleware};
pub use process::register_process_metrics;
pub use registry::{MetricRegistry, Sample};
