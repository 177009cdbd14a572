use std::string::FromUtf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration-time collision. Fatal at startup.
    #[error("Metric '{name}' is already registered")]
    DuplicateMetricName { name: String },

    #[error("Prometheus registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("Encoded metrics are not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),

    /// The request never matched a route; it is not counted.
    #[error("No route matched {method} {path}, skipping request metrics")]
    UnroutedRequest { method: String, path: String },

    /// The request future was dropped before a response existed.
    #[error("{method} {route} torn down before a response was produced")]
    TeardownBeforeResponse { method: String, route: String },
}
