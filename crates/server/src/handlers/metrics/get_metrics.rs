use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use prometheus::{Encoder, TextEncoder, proto::MetricFamily};
use serde_json::json;

use crate::state::AppState;

/// Prometheus scrape endpoint (text exposition format)
pub async fn get_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.registry.encode_text() {
        Ok(metrics) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
            metrics,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(target: "metrics", error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to gather metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// Same snapshot as [`get_metrics`], rendered as JSON
pub async fn get_metrics_json(State(state): State<AppState>) -> impl IntoResponse {
    let metric_families = state.registry.gather();

    let metrics_json: Vec<serde_json::Value> = metric_families
        .iter()
        .map(|mf: &MetricFamily| {
            json!({
                "name": mf.get_name(),
                "help": mf.get_help(),
                "type": format!("{:?}", mf.get_field_type()),
                "metrics": mf.get_metric().iter().map(|m| {
                    json!({
                        "labels": m.get_label().iter().map(|l| {
                            json!({
                                "name": l.get_name(),
                                "value": l.get_value()
                            })
                        }).collect::<Vec<_>>(),
                        "value": if m.has_counter() {
                            json!(m.get_counter().get_value())
                        } else if m.has_gauge() {
                            json!(m.get_gauge().get_value())
                        } else {
                            json!(null)
                        }
                    })
                }).collect::<Vec<_>>()
            })
        })
        .collect();

    (StatusCode::OK, axum::Json(metrics_json)).into_response()
}
