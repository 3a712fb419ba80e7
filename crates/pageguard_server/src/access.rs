//! Access-guard middleware: turns guard denials into `403 Forbidden`.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use pageguard_core::access::{check_referer, referer_host};
use serde_json::json;

fn forbidden() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": "Access denied" })),
    )
        .into_response()
}

/// Raw `Referer` header value.
///
/// A header that is present but not valid UTF-8 yields `Some("")` so that
/// it is still treated as a referer and fails every allow-list.
fn referer_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::REFERER)
        .map(|value| value.to_str().unwrap_or_default())
}

/// Host derived from the `Referer` header.
///
/// A referer that carries no parsable host maps to an empty host, which
/// never matches the allow-list.
pub(crate) fn request_referer_host(headers: &HeaderMap) -> Option<String> {
    referer_header(headers).map(|referer| referer_host(referer).unwrap_or_default())
}

/// Admit requests whose referer host is allow-listed, or referer-less
/// requests on a bypass path.
pub async fn require_allowed_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let referer_host = request_referer_host(request.headers());
    let decision = state
        .guard
        .check_access(referer_host.as_deref(), request.uri().path());
    if decision.is_allowed() {
        next.run(request).await
    } else {
        forbidden()
    }
}

/// Require a referer matching the configured referer patterns.
///
/// Passes every request through when no referer patterns are configured.
pub async fn require_allowed_referer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(patterns) = state.config.referer_patterns.as_deref() else {
        return next.run(request).await;
    };
    let decision = check_referer(referer_header(request.headers()), patterns);
    if decision.is_allowed() {
        next.run(request).await
    } else {
        forbidden()
    }
}
