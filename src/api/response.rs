use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::domain::{Decision, MALFORMED_MESSAGE};

/// Plain-text response with the given status.
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

/// Response for a denial. Allow has no response of its own; the origin's is
/// relayed instead.
pub fn deny_response(decision: &Decision) -> Response {
    match decision {
        Decision::Deny { status, message } => text_response(
            StatusCode::from_u16(*status).unwrap_or(StatusCode::FORBIDDEN),
            message.clone(),
        ),
        Decision::Allow => malformed_response(),
    }
}

/// The uniform fail-closed response.
pub fn malformed_response() -> Response {
    text_response(StatusCode::FORBIDDEN, MALFORMED_MESSAGE)
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub policy_version: String,
    pub rules: usize,
    pub uptime_secs: u64,
}
