use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::Span;

use crate::{
    logging::http_logger_middleware, metrics::request_metrics_middleware, routes, state::AppState,
};

/// Wrap `router` in the request counters.
///
/// Panics are turned into `500` responses inside the counting layer so they
/// are recorded like any other server error.
pub fn instrument(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.layer(CatchPanicLayer::new()).layer(middleware::from_fn_with_state(
        state.clone(),
        request_metrics_middleware,
    ))
}

/// One `http.request` span per request, named after the route template
fn make_request_span(req: &Request) -> Span {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("-");

    tracing::info_span!(
        "http.request",
        method = %req.method(),
        route = %route,
        uri = %req.uri(),
    )
}

pub fn create_app(state: AppState) -> Router {
    let counted = Router::new()
        .merge(routes::health::routes())
        .merge(routes::v1::routes());

    let mut app = Router::new().merge(instrument(counted, &state));

    if state.config.metrics.enabled {
        app = app.merge(routes::metrics::routes());
    }

    app.layer(middleware::from_fn(http_logger_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_request(())
                .on_response(())
                .on_failure(()),
        )
        .with_state(state)
}
