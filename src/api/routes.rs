use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::Decision;
use crate::gate::Gate;
use crate::observability::MetricsRegistry;

use super::forward::Upstream;
use super::request::GateRequest;
use super::response::{deny_response, malformed_response, text_response, HealthResponse};

/// Shared application state.
pub struct AppState {
    /// Unsealing pipeline and rules
    pub gate: Arc<Gate>,

    /// Where admitted requests go
    pub upstream: Arc<dyn Upstream>,

    /// Request counters
    pub metrics: Arc<MetricsRegistry>,

    /// Application start time
    pub start_time: Instant,

    /// Application version
    pub version: String,

    /// Largest request body the gate will buffer
    pub max_body_bytes: usize,
}

/// Create the application router.
///
/// Everything outside `/__sealgate/` is gated.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/__sealgate/health", get(handle_health))
        .route("/__sealgate/metrics", get(handle_metrics))
        .fallback(handle_gate)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gate a request: unseal, evaluate, then forward or deny.
async fn handle_gate(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let request_id = Uuid::new_v4();

    if request.method() != Method::POST {
        state.metrics.record_malformed_request();
        warn!(%request_id, method = %request.method(), "Rejected non-POST request");
        return malformed_response();
    }

    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            state.metrics.record_malformed_request();
            warn!(%request_id, error = %e, "Failed to read request body");
            return malformed_response();
        }
    };

    let gate_request = match GateRequest::from_body(&body) {
        Ok(req) => req,
        Err(e) => {
            state.metrics.record_malformed_request();
            warn!(%request_id, error = %e, "Request body has no sealed result");
            return malformed_response();
        }
    };

    let start = Instant::now();
    let verdict = state.gate.check(gate_request.sealed_result());
    state.metrics.record_latency(start);
    state
        .metrics
        .record_decision(&verdict.decision, verdict.failure.as_ref());

    if let Some(failure) = &verdict.failure {
        warn!(
            %request_id,
            kind = failure.kind(),
            tampering = failure.is_tampering(),
            error = %failure,
            "Sealed result rejected"
        );
        return deny_response(&verdict.decision);
    }

    if let Decision::Deny { status, .. } = &verdict.decision {
        if let Some(evidence) = &verdict.evidence {
            info!(
                %request_id,
                status,
                rule_id = %evidence.rule_id,
                path = %evidence.path,
                value = %evidence.value,
                limit = evidence.limit.as_deref().unwrap_or("-"),
                "Request denied by rule"
            );
        }
        return deny_response(&verdict.decision);
    }

    debug!(
        %request_id,
        latency_us = start.elapsed().as_micros() as u64,
        "Request allowed"
    );

    match state.upstream.forward(parts, body).await {
        Ok(response) => response,
        Err(e) => {
            state.metrics.record_upstream_error();
            error!(%request_id, error = %e, "Origin request failed");
            text_response(StatusCode::BAD_GATEWAY, "Bad Gateway")
        }
    }
}

/// Health check endpoint.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ruleset = state.gate.ruleset();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        policy_version: ruleset.policy_version.clone(),
        rules: ruleset.len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// Metrics endpoint (Prometheus format).
async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = format!(
        r#"# HELP sealgate_uptime_seconds Application uptime in seconds
# TYPE sealgate_uptime_seconds counter
sealgate_uptime_seconds {}

# HELP sealgate_rules Number of rules loaded
# TYPE sealgate_rules gauge
sealgate_rules {}

{}"#,
        state.start_time.elapsed().as_secs(),
        state.gate.ruleset().len(),
        state.metrics.to_prometheus(),
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        metrics,
    )
}
