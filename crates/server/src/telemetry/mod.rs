// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! OpenTelemetry push pipeline: OTLP/HTTP span export for the `tracing`
//! subscriber and OTLP/HTTP metric export of the request counters.

pub mod bridge;
pub mod error;

pub use bridge::RequestCountersBridge;
pub use error::TelemetryError;

use std::{sync::Arc, time::Duration};

use opentelemetry::{metrics::MeterProvider as _, trace::TracerProvider as _};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
    trace::SdkTracerProvider,
};
use sight_api_config::TelemetryConfig;
use tracing_subscriber::Layer;

use crate::{logging::BoxedLayer, metrics::MetricRegistry};

const METER_NAME: &str = "sight-api";

pub fn resource(config: &TelemetryConfig) -> Resource {
    Resource::builder()
        .with_service_name(config.service_name.clone())
        .build()
}

/// Build the tracer provider when trace export is enabled
pub fn init_tracer_provider(
    config: &TelemetryConfig,
) -> Result<Option<SdkTracerProvider>, TelemetryError> {
    if !config.traces_enabled {
        return Ok(None);
    }

    let endpoint = config
        .signal_url("traces")
        .ok_or(TelemetryError::MissingEndpoint("trace"))?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint.clone())
        .build()
        .map_err(|e| TelemetryError::ExporterBuild {
            signal: "trace",
            message: e.to_string(),
        })?;

    let provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(resource(config))
        .build();

    tracing::debug!(target: "telemetry", endpoint = %endpoint, "OTLP trace export configured");
    Ok(Some(provider))
}

/// Subscriber layer that turns `tracing` spans into OTel spans
pub fn tracing_layer(provider: &SdkTracerProvider, config: &TelemetryConfig) -> BoxedLayer {
    tracing_opentelemetry::layer()
        .with_tracer(provider.tracer(config.service_name.clone()))
        .boxed()
}

/// Build the meter provider and bridge the request counters onto it when
/// metric export is enabled
pub fn init_meter_provider(
    config: &TelemetryConfig,
    registry: Arc<MetricRegistry>,
) -> Result<Option<(SdkMeterProvider, RequestCountersBridge)>, TelemetryError> {
    if !config.metrics_enabled {
        return Ok(None);
    }

    let endpoint = config
        .signal_url("metrics")
        .ok_or(TelemetryError::MissingEndpoint("metrics"))?;

    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_http()
        .with_endpoint(endpoint.clone())
        .build()
        .map_err(|e| TelemetryError::ExporterBuild {
            signal: "metrics",
            message: e.to_string(),
        })?;

    let interval = Duration::from_secs(config.export_interval_secs.max(1));
    let reader = PeriodicReader::builder(exporter)
        .with_interval(interval)
        .build();

    let provider = SdkMeterProvider::builder()
        .with_reader(reader)
        .with_resource(resource(config))
        .build();

    let bridge = RequestCountersBridge::register(&provider.meter(METER_NAME), registry);

    tracing::info!(
        target: "telemetry",
        endpoint = %endpoint,
        interval_secs = interval.as_secs(),
        "OTLP metric export configured"
    );
    Ok(Some((provider, bridge)))
}

/// Owns the providers for the lifetime of the process
#[derive(Default)]
pub struct TelemetryGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    bridge: Option<RequestCountersBridge>,
}

impl TelemetryGuard {
    pub fn new(
        tracer_provider: Option<SdkTracerProvider>,
        meter: Option<(SdkMeterProvider, RequestCountersBridge)>,
    ) -> Self {
        let (meter_provider, bridge) = match meter {
            Some((provider, bridge)) => (Some(provider), Some(bridge)),
            None => (None, None),
        };

        Self {
            tracer_provider,
            meter_provider,
            bridge,
        }
    }

    /// Flush and stop both pipelines. Blocks on the final export, so call it
    /// off the async runtime. Failures are logged only; counter state lives in
    /// the registry and is unaffected.
    pub fn shutdown(self) {
        if let Some(provider) = self.meter_provider {
            if let Err(e) = provider.shutdown() {
                let err = TelemetryError::ExportUnavailable {
                    signal: "metrics",
                    message: e.to_string(),
                };
                tracing::warn!(target: "telemetry", "{}", err);
            }
        }
        drop(self.bridge);

        if let Some(provider) = self.tracer_provider {
            if let Err(e) = provider.shutdown() {
                let err = TelemetryError::ExportUnavailable {
                    signal: "trace",
                    message: e.to_string(),
                };
                tracing::warn!(target: "telemetry", "{}", err);
            }
        }
    }
}
