// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref PROMETHEUS_PREFIX: Regex =
        Regex::new(r"^[a-zA-Z_:][a-zA-Z0-9_:]*$").expect("static prefix pattern is valid");
}

#[derive(Debug, Error)]
pub enum MetricsConfigError {
    #[error(
        "Invalid Prometheus prefix '{0}': must start with [a-zA-Z_:] and contain only [a-zA-Z0-9_:]"
    )]
    InvalidPrometheusPrefix(String),
}

/// Configuration for the Prometheus registry and scrape endpoints
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Mount the `/metrics` and `/metrics.json` scrape endpoints
    ///
    /// Env: SIGHT_METRICS_ENABLED
    /// Default: true
    pub enabled: bool,

    /// Prometheus metric name prefix. Empty means metrics are exposed
    /// under their bare names (e.g. `requests_total`).
    ///
    /// Env: SIGHT_METRICS_PROM_PREFIX
    /// Default: ""
    pub prometheus_prefix: String,

    /// Register process metrics (CPU, memory, file descriptors). Linux only.
    ///
    /// Env: SIGHT_METRICS_PROCESS
    /// Default: true
    pub process_metrics: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            prometheus_prefix: String::new(),
            process_metrics: true,
        }
    }
}

impl MetricsConfig {
    pub fn validate(&self) -> Result<(), MetricsConfigError> {
        // Names Prometheus would reject are caught here rather than at scrape time
        if !self.prometheus_prefix.is_empty() && !PROMETHEUS_PREFIX.is_match(&self.prometheus_prefix)
        {
            return Err(MetricsConfigError::InvalidPrometheusPrefix(
                self.prometheus_prefix.clone(),
            ));
        }

        Ok(())
    }

    /// The prefix as the registry expects it, `None` when unset
    pub fn prefix(&self) -> Option<&str> {
        if self.prometheus_prefix.is_empty() {
            None
        } else {
            Some(&self.prometheus_prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_prefix(prefix: &str) -> MetricsConfig {
        MetricsConfig {
            prometheus_prefix: prefix.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_metrics_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert!(config.process_metrics);
        assert_eq!(config.prefix(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_prometheus_prefix_with_underscore() {
        let config = with_prefix("my_app_metrics");
        assert!(config.validate().is_ok());
        assert_eq!(config.prefix(), Some("my_app_metrics"));
    }

    #[test]
    fn test_valid_prometheus_prefix_with_colon() {
        assert!(with_prefix("app:metrics").validate().is_ok());
    }

    #[test]
    fn test_valid_prometheus_prefix_starting_with_underscore() {
        assert!(with_prefix("_metrics").validate().is_ok());
    }

    #[test]
    fn test_invalid_prometheus_prefix_starting_with_number() {
        assert!(with_prefix("123metrics").validate().is_err());
    }

    #[test]
    fn test_invalid_prometheus_prefix_with_hyphen() {
        assert!(with_prefix("my-metrics").validate().is_err());
    }

    #[test]
    fn test_invalid_prometheus_prefix_with_special_chars() {
        assert!(with_prefix("my.metrics").validate().is_err());
    }
}
