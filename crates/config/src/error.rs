use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration from environment: {0}")]
    EnvError(#[from] envy::Error),

    #[error("Failed to load env file '{path}': {source}")]
    EnvFileError {
        path: String,
        #[source]
        source: dotenv::Error,
    },

    #[error("Metrics configuration error: {0}")]
    MetricsError(#[from] crate::metrics::MetricsConfigError),

    #[error("Telemetry configuration error: {0}")]
    TelemetryError(#[from] crate::telemetry::TelemetryConfigError),

    #[error("{0}")]
    ValidateError(String),
}
