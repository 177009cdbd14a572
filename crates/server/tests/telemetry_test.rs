use std::{net::TcpListener, sync::Arc};

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use sight_api::{
    app::create_app,
    metrics::REQUESTS_TOTAL,
    state::AppState,
    telemetry::{self, TelemetryGuard},
};
use sight_api_config::{ServiceConfig, TelemetryConfig};
use tower::ServiceExt;

/// An http URL on a local port with nothing listening
fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

// Plain test: the OTLP client is blocking and must not be built or dropped
// inside the async runtime.
#[test]
fn test_unreachable_collector_does_not_affect_requests() {
    let mut config = ServiceConfig::default();
    config.metrics.process_metrics = false;
    config.telemetry = TelemetryConfig {
        endpoint: Some(closed_endpoint()),
        metrics_enabled: true,
        export_interval_secs: 1,
        ..Default::default()
    };
    let state = AppState::new(config).unwrap();

    let (provider, bridge) =
        telemetry::init_meter_provider(&state.config.telemetry, Arc::clone(&state.registry))
            .unwrap()
            .expect("metric export is enabled");

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let app = create_app(state.clone());
        for _ in 0..20 {
            let request = Request::builder()
                .uri("/v1/users")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    });

    // The export fails on the reader thread; nothing reaches the registry
    let _ = provider.force_flush();
    assert_eq!(
        state
            .registry
            .counter_value(REQUESTS_TOTAL, &[("path", "/v1/users")]),
        20.0
    );

    // Shutdown reports the failure through the log only
    TelemetryGuard::new(None, Some((provider, bridge))).shutdown();
    assert_eq!(
        state
            .registry
            .counter_value(REQUESTS_TOTAL, &[("path", "/v1/users")]),
        20.0
    );
}
