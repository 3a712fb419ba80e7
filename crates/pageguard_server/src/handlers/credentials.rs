//! Credential hashing HTTP handlers.

use crate::{error::HttpError, models::credential::*};
use axum::Json;
use pageguard_core::credentials::{self, CredentialHash};

/// Derive a fresh salt and hash for a password.
///
/// # Errors
/// Returns `500` when the OS random source is unavailable.
pub async fn hash_password(
    Json(req): Json<HashPasswordRequest>,
) -> Result<Json<CredentialHash>, HttpError> {
    Ok(Json(CredentialHash::derive(&req.password)?))
}

/// Check a password against a stored salt and hash.
pub async fn verify_password(Json(req): Json<VerifyPasswordRequest>) -> Json<VerifyPasswordResponse> {
    let valid = credentials::verify_hash(&req.password, &req.salt, &req.hash);
    Json(VerifyPasswordResponse { valid })
}
