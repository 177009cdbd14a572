// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("OpenTelemetry {0} export is enabled but no OTLP endpoint is configured")]
    MissingEndpoint(&'static str),

    #[error("Failed to build OTLP {signal} exporter: {message}")]
    ExporterBuild {
        signal: &'static str,
        message: String,
    },

    /// The collector could not be reached. Never surfaced to HTTP clients.
    #[error("OTLP {signal} export unavailable: {message}")]
    ExportUnavailable {
        signal: &'static str,
        message: String,
    },
}
