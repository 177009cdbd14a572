use super::{error::MetricsError, registry::MetricRegistry};

/// Register CPU, memory and file descriptor metrics for this process
#[cfg(target_os = "linux")]
pub fn register_process_metrics(registry: &MetricRegistry) -> Result<(), MetricsError> {
    use prometheus::process_collector::ProcessCollector;

    registry.register(Box::new(ProcessCollector::for_self()))
}

#[cfg(not(target_os = "linux"))]
pub fn register_process_metrics(_registry: &MetricRegistry) -> Result<(), MetricsError> {
    tracing::debug!(target: "metrics", "Process metrics are only available on Linux");
    Ok(())
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;

    #[test]
    fn test_process_metrics_registered() {
        let registry = MetricRegistry::new(Some("test")).unwrap();
        register_process_metrics(&registry).unwrap();

        let names: Vec<String> = registry.collect().map(|s| s.name).collect();
        assert!(names.iter().any(|n| n == "test_process_cpu_seconds_total"));
        assert!(register_process_metrics(&registry).is_err());
    }
}
