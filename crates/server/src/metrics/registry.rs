//! Isolated Prometheus registry shared by the request middleware (writer)
//! and the scrape handler / OpenTelemetry bridge (readers).

use prometheus::{
    Encoder, Registry, TextEncoder,
    core::Collector,
    proto::{Metric, MetricFamily},
};

use super::error::MetricsError;

/// One series as read from the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Fully-qualified family name, including the registry prefix
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
}

impl Sample {
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// True when every given label is present with the given value
    pub fn has_labels(&self, labels: &[(&str, &str)]) -> bool {
        labels
            .iter()
            .all(|(name, value)| self.label(name) == Some(*value))
    }
}

/// Registry independent of `prometheus::default_registry()`, so several
/// can coexist in one process without name collisions.
pub struct MetricRegistry {
    registry: Registry,
    prefix: Option<String>,
}

impl MetricRegistry {
    pub fn new(prefix: Option<&str>) -> Result<Self, MetricsError> {
        let prefix = prefix.filter(|p| !p.is_empty()).map(str::to_string);
        let registry = Registry::new_custom(prefix.clone(), None)?;
        Ok(Self { registry, prefix })
    }

    /// Register a collector, failing with `DuplicateMetricName` on collision
    pub fn register(&self, collector: Box<dyn Collector>) -> Result<(), MetricsError> {
        let names: Vec<String> = collector
            .desc()
            .iter()
            .map(|desc| self.qualified_name(&desc.fq_name))
            .collect();

        self.registry.register(collector).map_err(|err| match err {
            prometheus::Error::AlreadyReg => MetricsError::DuplicateMetricName {
                name: names.join(", "),
            },
            // Same name registered with different help or labels
            prometheus::Error::Msg(msg) if msg.contains("same fully-qualified name") => {
                MetricsError::DuplicateMetricName {
                    name: names.join(", "),
                }
            }
            other => MetricsError::Registry(other),
        })
    }

    /// Name as exposed by this registry
    pub fn qualified_name(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, name),
            None => name.to_string(),
        }
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Latest committed value of every series. Each call takes a fresh
    /// snapshot; values are per-series, not a transaction across series.
    pub fn collect(&self) -> impl Iterator<Item = Sample> {
        self.registry.gather().into_iter().flat_map(|family| {
            let name = family.get_name().to_string();
            family
                .get_metric()
                .iter()
                .map(|metric| Sample {
                    name: name.clone(),
                    labels: metric
                        .get_label()
                        .iter()
                        .map(|pair| (pair.get_name().to_string(), pair.get_value().to_string()))
                        .collect(),
                    value: metric_value(metric),
                })
                .collect::<Vec<_>>()
        })
    }

    /// Sum of all series of `name` (unprefixed) carrying the given labels
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        let name = self.qualified_name(name);
        self.collect()
            .filter(|sample| sample.name == name && sample.has_labels(labels))
            .map(|sample| sample.value)
            .sum()
    }

    /// Render the current snapshot in the Prometheus text exposition format
    pub fn encode_text(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

fn metric_value(metric: &Metric) -> f64 {
    if metric.has_counter() {
        metric.get_counter().get_value()
    } else if metric.has_gauge() {
        metric.get_gauge().get_value()
    } else if metric.has_untyped() {
        metric.get_untyped().get_value()
    } else if metric.has_histogram() {
        metric.get_histogram().get_sample_count() as f64
    } else if metric.has_summary() {
        metric.get_summary().get_sample_count() as f64
    } else {
        0.0
    }
}
