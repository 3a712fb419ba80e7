//! Page lock HTTP handlers.

use super::normalize::{require_actor, require_identifier};
use crate::{error::HttpError, models::lock::*, AppError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

fn lock_key(resource: String) -> Result<String, AppError> {
    require_identifier("resource", Some(resource))
}

/// List all live page locks.
///
/// # Errors
/// Returns an error if the lock table cannot be read.
pub async fn list_locks(State(state): State<AppState>) -> Result<Json<Vec<LockRecord>>, HttpError> {
    Ok(Json(state.db.locks.list_live(Utc::now())?))
}

/// Fetch the live lock for one page.
///
/// # Returns
/// The lock row as JSON.
///
/// # Errors
/// Returns `404` when the page is not locked.
pub async fn get_lock(
    State(state): State<AppState>,
    Path((resource, resource_id)): Path<(String, i64)>,
) -> Result<Json<LockRecord>, HttpError> {
    let resource = lock_key(resource)?;
    state
        .db
        .locks
        .get_live(&resource, resource_id, Utc::now())?
        .map(Json)
        .ok_or_else(|| AppError::NotFound.into())
}

/// Acquire (or refresh) a page lock for the requesting actor.
///
/// # Returns
/// `200` with the new lock when acquired; `423 Locked` with the current
/// holder's row when another actor holds a live lock.
///
/// # Errors
/// Returns `400` for blank identifiers, or a storage error.
pub async fn acquire_lock(
    State(state): State<AppState>,
    Path((resource, resource_id)): Path<(String, i64)>,
    Json(req): Json<AcquireLockRequest>,
) -> Result<Response, HttpError> {
    let resource = lock_key(resource)?;
    let actor = require_actor(Some(req.actor_id))?;
    let outcome = state
        .db
        .locks
        .try_acquire(&resource, resource_id, &actor, Utc::now())?;
    let status = if outcome.is_acquired() {
        StatusCode::OK
    } else {
        StatusCode::LOCKED
    };
    Ok((status, Json(outcome)).into_response())
}

/// Release a page lock.
///
/// With `force=true` the lock is deleted regardless of holder. Otherwise
/// `actor_id` is required and only the live holder may release.
///
/// # Returns
/// `200` with `released` or `not_locked`; `403` with the holder's row when
/// another actor holds the lock.
///
/// # Errors
/// Returns `400` when `actor_id` is missing on a non-forced release.
pub async fn release_lock(
    State(state): State<AppState>,
    Path((resource, resource_id)): Path<(String, i64)>,
    Query(query): Query<ReleaseLockQuery>,
) -> Result<Response, HttpError> {
    let resource = lock_key(resource)?;

    if query.force.unwrap_or(false) {
        tracing::warn!("Force release requested for page lock {}/{}", resource, resource_id);
        let outcome = if state.db.locks.release(&resource, resource_id)? {
            ReleaseOutcome::Released
        } else {
            ReleaseOutcome::NotLocked
        };
        return Ok(Json(outcome).into_response());
    }

    let actor = require_actor(query.actor_id)?;
    let outcome = state
        .db
        .locks
        .release_held(&resource, resource_id, &actor, Utc::now())?;
    let status = match outcome {
        ReleaseOutcome::HeldByOther(_) => StatusCode::FORBIDDEN,
        ReleaseOutcome::Released | ReleaseOutcome::NotLocked => StatusCode::OK,
    };
    Ok((status, Json(outcome)).into_response())
}
