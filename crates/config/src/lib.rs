mod args;
mod error;
mod express;
mod log;
mod metrics;
mod telemetry;

pub use args::{Args, DEFAULT_ENV_FILE};
pub use error::ConfigError;
pub use express::ExpressConfig;
pub use log::LogConfig;
pub use metrics::{MetricsConfig, MetricsConfigError};
pub use telemetry::{TelemetryConfig, TelemetryConfigError};

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "SIGHT_";

/// Standard OpenTelemetry variable honoured when `SIGHT_OTEL_ENDPOINT` is unset
pub const OTEL_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Flat view of the `SIGHT_*` environment, as envy sees it
#[derive(Debug, Deserialize)]
struct EnvConfig {
    #[serde(default = "express::default_host")]
    express_host: String,
    #[serde(default = "express::default_port")]
    express_port: u16,

    #[serde(default = "log::default_level")]
    log_level: String,
    #[serde(default)]
    log_json: bool,
    #[serde(default)]
    log_strip_ansi: bool,
    #[serde(default)]
    log_write: bool,
    #[serde(default = "log::default_write_path")]
    log_write_path: String,
    #[serde(default = "log::default_write_max_file_size")]
    log_write_max_file_size: u64,
    #[serde(default = "log::default_write_max_files")]
    log_write_max_files: usize,
    #[serde(default)]
    log_loki_url: Option<String>,

    #[serde(default = "default_true")]
    metrics_enabled: bool,
    #[serde(default)]
    metrics_prom_prefix: String,
    #[serde(default = "default_true")]
    metrics_process: bool,

    #[serde(default)]
    otel_endpoint: Option<String>,
    #[serde(default = "telemetry::default_service_name")]
    otel_service_name: String,
    #[serde(default)]
    otel_traces: bool,
    #[serde(default)]
    otel_metrics: bool,
    #[serde(default = "telemetry::default_export_interval_secs")]
    otel_export_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub express: ExpressConfig,
    pub log: LogConfig,
    pub metrics: MetricsConfig,
    pub telemetry: TelemetryConfig,
}

impl ServiceConfig {
    /// Load and validate configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load variables from an env file into the process environment, then
    /// read the configuration. A missing file is only an error when
    /// `required` is set.
    pub fn from_env_file(path: impl AsRef<Path>, required: bool) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match dotenv::from_path(path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(e)) if !required && e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ConfigError::EnvFileError {
                    path: path.display().to_string(),
                    source,
                });
            }
        }
        Self::from_env()
    }

    /// Build configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let fallback_endpoint = vars
            .iter()
            .find(|(key, _)| key == OTEL_ENDPOINT_ENV)
            .map(|(_, value)| value.clone());

        let env = envy::prefixed(ENV_PREFIX).from_iter::<_, EnvConfig>(vars)?;
        let config = Self::from_flat(env, fallback_endpoint);
        config.validate()?;
        Ok(config)
    }

    fn from_flat(env: EnvConfig, fallback_endpoint: Option<String>) -> Self {
        Self {
            express: ExpressConfig {
                host: env.express_host,
                port: env.express_port,
            },
            log: LogConfig {
                level: env.log_level,
                json: env.log_json,
                strip_ansi: env.log_strip_ansi,
                write: env.log_write,
                write_path: env.log_write_path,
                write_max_file_size: env.log_write_max_file_size,
                write_max_files: env.log_write_max_files,
                loki_url: env.log_loki_url.filter(|url| !url.is_empty()),
            },
            metrics: MetricsConfig {
                enabled: env.metrics_enabled,
                prometheus_prefix: env.metrics_prom_prefix,
                process_metrics: env.metrics_process,
            },
            telemetry: TelemetryConfig {
                endpoint: env
                    .otel_endpoint
                    .or(fallback_endpoint)
                    .filter(|url| !url.is_empty()),
                service_name: env.otel_service_name,
                traces_enabled: env.otel_traces,
                metrics_enabled: env.otel_metrics,
                export_interval_secs: env.otel_export_interval_secs,
            },
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.express.validate()?;
        self.log.validate()?;
        self.metrics.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }
}

/// Accept only absolute http(s) URLs
pub(crate) fn validate_http_url(url_str: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(url_str)
        .map_err(|e| ConfigError::ValidateError(format!("Invalid URL '{}': {}", url_str, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::ValidateError(format!(
            "Invalid URL scheme '{}'. Must be http:// or https://",
            scheme
        ))),
    }
}
