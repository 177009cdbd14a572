use crate::ConfigError;

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log Level
    ///
    /// Env: SIGHT_LOG_LEVEL
    /// Valid values: trace, debug, info, warn, error, http
    /// Default: info
    pub level: String,

    /// Output logs in JSON format
    ///
    /// Env: SIGHT_LOG_JSON
    /// Default: false
    pub json: bool,

    /// Strip ANSI color codes from logs
    ///
    /// Env: SIGHT_LOG_STRIP_ANSI
    /// Default: false
    pub strip_ansi: bool,

    /// Write logs to a rotating file in addition to the console
    ///
    /// Env: SIGHT_LOG_WRITE
    /// Default: false
    pub write: bool,

    /// Directory for log files
    ///
    /// Env: SIGHT_LOG_WRITE_PATH
    /// Default: ./logs
    pub write_path: String,

    /// Size in bytes at which the log file is rotated
    ///
    /// Env: SIGHT_LOG_WRITE_MAX_FILE_SIZE
    /// Default: 5242880 (5MB)
    pub write_max_file_size: u64,

    /// Number of log files to keep, including the current one
    ///
    /// Env: SIGHT_LOG_WRITE_MAX_FILES
    /// Default: 5
    pub write_max_files: usize,

    /// Loki push URL. Logs are shipped to Loki when set.
    ///
    /// Env: SIGHT_LOG_LOKI_URL
    /// Default: unset
    pub loki_url: Option<String>,
}

pub(crate) const VALID_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "http"];

pub(crate) fn default_level() -> String {
    "info".to_string()
}

pub(crate) fn default_write_path() -> String {
    "./logs".to_string()
}

pub(crate) fn default_write_max_file_size() -> u64 {
    5 * 1024 * 1024
}

pub(crate) fn default_write_max_files() -> usize {
    5
}

impl LogConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LEVELS.contains(&self.level.as_str()) {
            return Err(ConfigError::ValidateError(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.level,
                VALID_LEVELS.join(", ")
            )));
        }

        if self.write {
            if self.write_path.is_empty() {
                return Err(ConfigError::ValidateError(
                    "Log write path cannot be empty when file logging is enabled".to_string(),
                ));
            }
            if self.write_max_file_size == 0 {
                return Err(ConfigError::ValidateError(
                    "Log max file size must be greater than 0".to_string(),
                ));
            }
            if self.write_max_files == 0 {
                return Err(ConfigError::ValidateError(
                    "Log max files must be at least 1".to_string(),
                ));
            }
        }

        if let Some(url) = &self.loki_url {
            crate::validate_http_url(url)?;
        }

        Ok(())
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
            strip_ansi: false,
            write: false,
            write_path: default_write_path(),
            write_max_file_size: default_write_max_file_size(),
            write_max_files: default_write_max_files(),
            loki_url: None,
        }
    }
}
