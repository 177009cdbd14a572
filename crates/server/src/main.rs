use std::{net::SocketAddr, sync::Arc};

use sight_api::{
    app,
    logging::{self, LoggingConfig},
    state::AppState,
    telemetry::{self, TelemetryGuard},
};
use sight_api_config::{Args, ServiceConfig};
use tokio::signal;

#[cfg(not(target_os = "windows"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse_args();
    let config = ServiceConfig::from_env_file(&args.env_file, args.env_file_is_explicit())?;

    let tracer_provider = telemetry::init_tracer_provider(&config.telemetry)?;
    let otel_layer = tracer_provider
        .as_ref()
        .map(|provider| telemetry::tracing_layer(provider, &config.telemetry));

    let _log_guard = logging::init_with_config(LoggingConfig::from_config(
        &config.log,
        &config.telemetry.service_name,
        otel_layer,
    ))?;

    let state = AppState::new(config)?;

    let meter = telemetry::init_meter_provider(&state.config.telemetry, Arc::clone(&state.registry))?;
    let telemetry_guard = TelemetryGuard::new(tracer_provider, meter);

    let ip = state
        .config
        .express
        .ip()
        .ok_or_else(|| anyhow::anyhow!("invalid bind host {}", state.config.express.host))?;
    let addr = SocketAddr::new(ip, state.config.express.port);

    tracing::info!("Starting server on {}", addr);
    tracing::info!("Log level: {}", state.config.log.level);
    tracing::info!(
        "Metrics: scrape={} prefix={:?} process={}",
        state.config.metrics.enabled,
        state.config.metrics.prefix(),
        state.config.metrics.process_metrics
    );
    tracing::info!(
        "OpenTelemetry: traces={} metrics={}",
        state.config.telemetry.traces_enabled,
        state.config.telemetry.metrics_enabled
    );

    let app = app::create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, flushing telemetry");
    tokio::task::spawn_blocking(move || telemetry_guard.shutdown()).await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => tracing::error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
