use rolling_file::*;
use sight_api_config::LogConfig;
use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level '{level}': {source}")]
    InvalidLogLevel {
        level: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    #[error("Failed to create log directory or file appender: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse Loki URL '{url}': {source}")]
    InvalidLokiUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to configure Loki integration: {0}")]
    LokiError(#[from] tracing_loki::Error),

    #[error("A global subscriber is already installed: {0}")]
    Init(#[from] TryInitError),
}

/// A subscriber layer installed on top of the base registry
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configuration for logging initialization
pub struct LoggingConfig<'a> {
    pub level: &'a str,
    pub json_format: bool,
    pub strip_ansi: bool,
    pub write_to_file: bool,
    pub write_path: &'a str,
    pub write_max_file_size: u64,
    pub write_max_files: usize,
    pub loki_url: Option<&'a str>,
    /// Value of the `service` label attached to Loki streams
    pub service_name: &'a str,
    /// When set, spans are also exported through OpenTelemetry
    pub otel_layer: Option<BoxedLayer>,
}

impl<'a> LoggingConfig<'a> {
    pub fn from_config(
        log: &'a LogConfig,
        service_name: &'a str,
        otel_layer: Option<BoxedLayer>,
    ) -> Self {
        Self {
            level: &log.level,
            json_format: log.json,
            strip_ansi: log.strip_ansi,
            write_to_file: log.write,
            write_path: &log.write_path,
            write_max_file_size: log.write_max_file_size,
            write_max_files: log.write_max_files,
            loki_url: log.loki_url.as_deref(),
            service_name,
            otel_layer,
        }
    }
}

/// Resolve the configured level to an `EnvFilter` directive.
///
/// `http` keeps everything at info but turns on the per-request access log,
/// which is emitted at debug under the `http` target.
pub fn filter_directive(level: &str) -> &str {
    if level == "http" { "info,http=debug" } else { level }
}

/// Initialize tracing/logging with the specified configuration
///
/// # Examples
/// ```no_run
/// use sight_api::logging::{self, LoggingConfig};
///
/// let _guard = logging::init_with_config(LoggingConfig {
///     level: "http",
///     json_format: true,
///     strip_ansi: false,
///     write_to_file: false,
///     write_path: "./logs",
///     write_max_file_size: 5242880,
///     write_max_files: 5,
///     loki_url: None,
///     service_name: "sight-api",
///     otel_layer: None,
/// })?;
/// # Ok::<(), sight_api::logging::LoggingError>(())
/// ```
///
/// # Log Rotation
/// When a log file reaches `write_max_file_size`, it is rotated:
/// - Current: logs.log
/// - After rotation: logs.log.1, logs.log.2, etc.
/// - Keeps up to `write_max_files` files in total
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
pub fn init_with_config(config: LoggingConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_new(filter_directive(config.level)).map_err(|source| {
        LoggingError::InvalidLogLevel {
            level: config.level.to_string(),
            source,
        }
    })?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if config.json_format {
        layers.push(fmt::layer().json().boxed());
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(!config.strip_ansi)
                .boxed(),
        );
    }

    let mut guard = None;
    if config.write_to_file {
        std::fs::create_dir_all(config.write_path)?;

        let log_file_path = PathBuf::from(config.write_path).join("logs.log");
        // write_max_files counts the live file too
        let rotated_files_count = config.write_max_files.saturating_sub(1);
        let file_appender = BasicRollingFileAppender::new(
            log_file_path,
            RollingConditionBasic::new().max_size(config.write_max_file_size),
            rotated_files_count,
        )?;

        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        if config.json_format {
            layers.push(fmt::layer().json().with_writer(non_blocking).boxed());
        } else {
            layers.push(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .boxed(),
            );
        }
    }

    if let Some(url) = config.loki_url {
        let parsed_url = url::Url::parse(url).map_err(|source| LoggingError::InvalidLokiUrl {
            url: url.to_string(),
            source,
        })?;

        let (loki_layer, task) = tracing_loki::builder()
            .label("service", config.service_name)?
            .extra_field("pid", format!("{}", std::process::id()))?
            .build_url(parsed_url)?;

        tokio::spawn(task);
        layers.push(loki_layer.boxed());
    }

    if let Some(otel_layer) = config.otel_layer {
        layers.push(otel_layer);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_level_enables_access_log() {
        assert_eq!(filter_directive("http"), "info,http=debug");
        assert_eq!(filter_directive("warn"), "warn");
    }

    #[test]
    fn test_from_config_borrows_log_settings() {
        let log = LogConfig {
            level: "debug".to_string(),
            loki_url: Some("http://loki:3100".to_string()),
            ..Default::default()
        };

        let config = LoggingConfig::from_config(&log, "sight-api", None);
        assert_eq!(config.level, "debug");
        assert_eq!(config.loki_url, Some("http://loki:3100"));
        assert_eq!(config.write_max_files, 5);
        assert!(config.otel_layer.is_none());
    }

    #[test]
    fn test_invalid_loki_url_is_rejected_before_install() {
        let result = init_with_config(LoggingConfig {
            level: "info",
            json_format: false,
            strip_ansi: true,
            write_to_file: false,
            write_path: "./logs",
            write_max_file_size: 1024,
            write_max_files: 1,
            loki_url: Some("not a url"),
            service_name: "sight-api",
            otel_layer: None,
        });

        assert!(matches!(result, Err(LoggingError::InvalidLokiUrl { .. })));
    }
}
