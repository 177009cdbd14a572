use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryConfigError {
    #[error("OpenTelemetry {0} export is enabled but no OTLP endpoint is configured")]
    MissingEndpoint(&'static str),

    #[error("Export interval must be at least 1 second")]
    InvalidInterval,

    #[error("Service name cannot be empty")]
    EmptyServiceName,
}

/// OpenTelemetry push pipeline settings.
///
/// Traces and metrics are toggled independently so a single binary covers
/// scrape-only, scrape + traces and scrape + traces + OTLP metrics setups.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector base URL, e.g. `http://otel-collector:4318`
    ///
    /// Env: SIGHT_OTEL_ENDPOINT (falls back to OTEL_EXPORTER_OTLP_ENDPOINT)
    /// Default: unset
    pub endpoint: Option<String>,

    /// `service.name` resource attribute
    ///
    /// Env: SIGHT_OTEL_SERVICE_NAME
    /// Default: sight-api
    pub service_name: String,

    /// Export spans over OTLP
    ///
    /// Env: SIGHT_OTEL_TRACES
    /// Default: false
    pub traces_enabled: bool,

    /// Push request counters over OTLP
    ///
    /// Env: SIGHT_OTEL_METRICS
    /// Default: false
    pub metrics_enabled: bool,

    /// Periodic reader interval in seconds
    ///
    /// Env: SIGHT_OTEL_EXPORT_INTERVAL_SECS
    /// Default: 60
    pub export_interval_secs: u64,
}

pub(crate) fn default_service_name() -> String {
    "sight-api".to_string()
}

pub(crate) fn default_export_interval_secs() -> u64 {
    60
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            service_name: default_service_name(),
            traces_enabled: false,
            metrics_enabled: false,
            export_interval_secs: default_export_interval_secs(),
        }
    }
}

impl TelemetryConfig {
    pub(crate) fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.service_name.is_empty() {
            return Err(TelemetryConfigError::EmptyServiceName.into());
        }

        if self.export_interval_secs == 0 {
            return Err(TelemetryConfigError::InvalidInterval.into());
        }

        // The endpoint is only used, and therefore only checked, once an
        // export path is switched on.
        match &self.endpoint {
            Some(endpoint) if self.any_enabled() => crate::validate_http_url(endpoint)?,
            Some(_) => {}
            None if self.traces_enabled => {
                return Err(TelemetryConfigError::MissingEndpoint("trace").into());
            }
            None if self.metrics_enabled => {
                return Err(TelemetryConfigError::MissingEndpoint("metrics").into());
            }
            None => {}
        }

        Ok(())
    }

    /// True when any OTLP export path is switched on
    pub fn any_enabled(&self) -> bool {
        self.traces_enabled || self.metrics_enabled
    }

    /// Signal-specific OTLP/HTTP URL, e.g. `<endpoint>/v1/metrics`
    pub fn signal_url(&self, signal: &str) -> Option<String> {
        self.endpoint
            .as_deref()
            .map(|base| format!("{}/v1/{}", base.trim_end_matches('/'), signal))
    }
}
