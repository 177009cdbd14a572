use sight_api_config::ServiceConfig;
use std::sync::Arc;

use crate::metrics::{self, MetricRegistry, MetricsError, RequestCounters};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub registry: Arc<MetricRegistry>,
    pub counters: RequestCounters,
}

impl AppState {
    /// Build the registry and register every metric up front. A registration
    /// failure here means the service must not start.
    pub fn new(config: ServiceConfig) -> Result<Self, MetricsError> {
        let registry = MetricRegistry::new(config.metrics.prefix())?;
        let counters = RequestCounters::register(&registry)?;

        if config.metrics.process_metrics {
            metrics::register_process_metrics(&registry)?;
        }

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            counters,
        })
    }
}
