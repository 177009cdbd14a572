// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;

/// Access log middleware.
///
/// - Logs with DEBUG level (target: http) for 2xx/3xx responses
/// - Logs with WARN level for 4xx responses
/// - Logs with ERROR level for 5xx responses
///
/// The `route` field carries the matched route template (`-` when nothing
/// matched) so log lines can be joined with the request counters.
///
/// Log format: "METHOD /path STATUS DURATIONms"
/// Example: "GET /v1/compute?n=5 200 3ms"
pub async fn http_logger_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "-".to_string());
    let full_path = match req.uri().query() {
        Some(q) => format!("{}?{}", req.uri().path(), q),
        None => req.uri().path().to_string(),
    };
    let start = Instant::now();

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status_code = response.status().as_u16();

    match status_code {
        200..=399 => {
            tracing::debug!(
                target: "http",
                method = %method,
                path = %full_path,
                route = %route,
                status = status_code,
                duration_ms = duration_ms,
                "{} {} {} {}ms",
                method,
                full_path,
                status_code,
                duration_ms
            );
        }
        400..=499 => {
            tracing::warn!(
                target: "http",
                method = %method,
                path = %full_path,
                route = %route,
                status = status_code,
                duration_ms = duration_ms,
                "{} {} {} {}ms",
                method,
                full_path,
                status_code,
                duration_ms
            );
        }
        _ => {
            tracing::error!(
                target: "http",
                method = %method,
                path = %full_path,
                route = %route,
                status = status_code,
                duration_ms = duration_ms,
                "{} {} {} {}ms",
                method,
                full_path,
                status_code,
                duration_ms
            );
        }
    }

    response
}
