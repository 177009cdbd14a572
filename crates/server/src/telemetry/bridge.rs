// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Exposes the Prometheus request counters to the OpenTelemetry pipeline.
//!
//! The counters are written once, by the request middleware, into the
//! `MetricRegistry`. The OTel side only reads: each instrument is an
//! observable counter whose callback reports the registry's current
//! cumulative values whenever the meter provider's reader collects. The
//! reader runs on its own background thread, so neither collection nor a
//! failing export ever touches the request path.

use std::sync::Arc;

use opentelemetry::{
    KeyValue,
    metrics::{Meter, ObservableCounter},
};

use crate::metrics::{MetricRegistry, REQUESTS_ERROR_TOTAL, REQUESTS_TOTAL};

pub const REQUESTS_INSTRUMENT: &str = "requests";
pub const REQUESTS_ERROR_INSTRUMENT: &str = "requests.error";

/// Keeps the observable instruments registered on the meter
pub struct RequestCountersBridge {
    _success: ObservableCounter<u64>,
    _error: ObservableCounter<u64>,
}

impl RequestCountersBridge {
    pub fn register(meter: &Meter, registry: Arc<MetricRegistry>) -> Self {
        let success_family = registry.qualified_name(REQUESTS_TOTAL);
        let error_family = registry.qualified_name(REQUESTS_ERROR_TOTAL);

        Self {
            _success: observe_family(
                meter,
                REQUESTS_INSTRUMENT,
                "Total number of HTTP requests",
                registry.clone(),
                success_family,
            ),
            _error: observe_family(
                meter,
                REQUESTS_ERROR_INSTRUMENT,
                "Total number of HTTP request errors",
                registry,
                error_family,
            ),
        }
    }
}

fn observe_family(
    meter: &Meter,
    instrument: &'static str,
    description: &'static str,
    registry: Arc<MetricRegistry>,
    family: String,
) -> ObservableCounter<u64> {
    meter
        .u64_observable_counter(instrument)
        .with_description(description)
        .with_unit("{request}")
        .with_callback(move |observer| {
            for sample in registry.collect().filter(|sample| sample.name == family) {
                let attributes: Vec<KeyValue> = sample
                    .labels
                    .into_iter()
                    .map(|(name, value)| KeyValue::new(name, value))
                    .collect();
                observer.observe(sample.value as u64, &attributes);
            }
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RequestCounters;
    use opentelemetry::metrics::MeterProvider as _;
    use opentelemetry_sdk::metrics::{
        InMemoryMetricExporter, PeriodicReader, SdkMeterProvider, data::Sum,
    };

    type Point = (Vec<(String, String)>, u64);

    /// Data points of `instrument` in the most recent export, attributes
    /// sorted by key
    fn exported_points(exporter: &InMemoryMetricExporter, instrument: &str) -> Vec<Point> {
        let exports = exporter.get_finished_metrics().expect("finished metrics");
        let mut points = Vec::new();
        for resource in exports.iter().rev() {
            for scope in &resource.scope_metrics {
                for metric in scope.metrics.iter().filter(|m| m.name == instrument) {
                    let sum = metric
                        .data
                        .as_any()
                        .downcast_ref::<Sum<u64>>()
                        .expect("observable counter exports a u64 sum");
                    for point in &sum.data_points {
                        let mut attributes: Vec<(String, String)> = point
                            .attributes
                            .iter()
                            .map(|kv| (kv.key.as_str().to_string(), kv.value.to_string()))
                            .collect();
                        attributes.sort();
                        points.push((attributes, point.value));
                    }
                }
            }
            if !points.is_empty() {
                break;
            }
        }
        points
    }

    fn attributes(method: &str, path: &str, status: &str) -> Vec<(String, String)> {
        vec![
            ("method".to_string(), method.to_string()),
            ("path".to_string(), path.to_string()),
            ("status".to_string(), status.to_string()),
        ]
    }

    fn provider_with(exporter: &InMemoryMetricExporter) -> SdkMeterProvider {
        let reader = PeriodicReader::builder(exporter.clone()).build();
        SdkMeterProvider::builder().with_reader(reader).build()
    }

    #[test]
    fn test_bridge_exports_request_counters() {
        let registry = Arc::new(MetricRegistry::new(None).unwrap());
        let counters = RequestCounters::register(&registry).unwrap();
        for _ in 0..3 {
            counters.observe("GET", "/v1/users", 200);
        }
        counters.observe("GET", "/v1/compute", 500);

        let exporter = InMemoryMetricExporter::default();
        let provider = provider_with(&exporter);
        let _bridge =
            RequestCountersBridge::register(&provider.meter("bridge-test"), registry.clone());

        provider.force_flush().expect("force flush metrics");

        assert_eq!(
            exported_points(&exporter, REQUESTS_INSTRUMENT),
            vec![(attributes("GET", "/v1/users", "200"), 3)]
        );
        assert_eq!(
            exported_points(&exporter, REQUESTS_ERROR_INSTRUMENT),
            vec![(attributes("GET", "/v1/compute", "500"), 1)]
        );
    }

    #[test]
    fn test_prefixed_registry_is_bridged() {
        let registry = Arc::new(MetricRegistry::new(Some("sight")).unwrap());
        let counters = RequestCounters::register(&registry).unwrap();
        counters.observe("POST", "/v1/compute", 201);

        let exporter = InMemoryMetricExporter::default();
        let provider = provider_with(&exporter);
        let _bridge = RequestCountersBridge::register(&provider.meter("prefixed"), registry);

        provider.force_flush().expect("force flush metrics");

        assert_eq!(
            exported_points(&exporter, REQUESTS_INSTRUMENT),
            vec![(attributes("POST", "/v1/compute", "201"), 1)]
        );
        assert!(exported_points(&exporter, REQUESTS_ERROR_INSTRUMENT).is_empty());
    }

    #[test]
    fn test_rebuilding_export_path_keeps_registry_state() {
        let registry = Arc::new(MetricRegistry::new(None).unwrap());
        let counters = RequestCounters::register(&registry).unwrap();

        let first = InMemoryMetricExporter::default();
        let provider = provider_with(&first);
        let bridge = RequestCountersBridge::register(&provider.meter("first"), registry.clone());
        counters.observe("GET", "/v1/users", 200);
        provider.force_flush().expect("force flush metrics");
        assert_eq!(
            exported_points(&first, REQUESTS_INSTRUMENT),
            vec![(attributes("GET", "/v1/users", "200"), 1)]
        );
        let _ = provider.shutdown();
        drop(bridge);

        counters.observe("GET", "/v1/users", 200);

        let second = InMemoryMetricExporter::default();
        let provider = provider_with(&second);
        let _bridge = RequestCountersBridge::register(&provider.meter("second"), registry.clone());
        provider.force_flush().expect("force flush metrics");

        // The new pipeline starts from the cumulative registry value
        assert_eq!(
            exported_points(&second, REQUESTS_INSTRUMENT),
            vec![(attributes("GET", "/v1/users", "200"), 2)]
        );
        assert_eq!(
            registry.counter_value(REQUESTS_TOTAL, &[("path", "/v1/users")]),
            2.0
        );
    }
}
