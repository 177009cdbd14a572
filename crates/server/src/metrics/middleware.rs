use axum::{
    extract::{MatchedPath, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

use super::{
    counters::{RequestCounters, TEARDOWN_STATUS},
    error::MetricsError,
};

/// Methods recorded as-is. Anything else is folded into `OTHER`.
const KNOWN_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];

/// Method label with bounded cardinality
pub fn method_label(method: &Method) -> &'static str {
    KNOWN_METHODS
        .iter()
        .copied()
        .find(|known| *known == method.as_str())
        .unwrap_or("OTHER")
}

/// A request whose method and route template are known (START).
#[derive(Debug)]
pub struct RequestObservation {
    method: &'static str,
    route: String,
}

impl RequestObservation {
    /// Fails with `UnroutedRequest` when the router did not match; raw paths
    /// are never used as labels.
    pub fn start(
        method: &Method,
        path: &str,
        matched_path: Option<&MatchedPath>,
    ) -> Result<Self, MetricsError> {
        match matched_path {
            Some(route) => Ok(Self {
                method: method_label(method),
                route: route.as_str().to_string(),
            }),
            None => Err(MetricsError::UnroutedRequest {
                method: method.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Hand the request to the handler chain (DELEGATED)
    pub fn delegate(self, counters: RequestCounters) -> InFlightRequest {
        InFlightRequest {
            counters,
            method: self.method,
            route: self.route,
            observed: false,
        }
    }
}

/// Guard alive while the handler chain runs.
///
/// `observe` records the final status. If the guard is dropped first
/// (client disconnect, task cancelled, panic unwinding through the
/// middleware) the request is recorded as an error with `TEARDOWN_STATUS`.
/// Either way exactly one counter is incremented exactly once.
pub struct InFlightRequest {
    counters: RequestCounters,
    method: &'static str,
    route: String,
    observed: bool,
}

impl InFlightRequest {
    /// OBSERVED
    pub fn observe(mut self, status: StatusCode) {
        self.observed = true;
        self.counters.observe(self.method, &self.route, status.as_u16());
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        if self.observed {
            return;
        }
        self.observed = true;

        let teardown = MetricsError::TeardownBeforeResponse {
            method: self.method.to_string(),
            route: self.route.clone(),
        };
        tracing::warn!(target: "metrics", "{}", teardown);
        self.counters.observe(self.method, &self.route, TEARDOWN_STATUS);
    }
}

/// Request counting middleware.
///
/// Must be installed with `Router::layer` on the routes to be counted so that
/// `MatchedPath` is available. The scrape routes are mounted outside it.
pub async fn request_metrics_middleware(
    State(state): State<AppState>,
    matched_path: Option<MatchedPath>,
    req: Request,
    next: Next,
) -> Response {
    let observation =
        match RequestObservation::start(req.method(), req.uri().path(), matched_path.as_ref()) {
            Ok(observation) => observation,
            Err(skip) => {
                tracing::debug!(target: "metrics", "{}", skip);
                return next.run(req).await;
            }
        };

    let in_flight = observation.delegate(state.counters.clone());
    let response = next.run(req).await;
    in_flight.observe(response.status());

    response
}
