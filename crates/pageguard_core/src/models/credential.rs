//! Credential hashing request and response payloads.

use serde::{Deserialize, Serialize};

/// Request payload for deriving a salt and hash.
#[derive(Debug, Deserialize)]
pub struct HashPasswordRequest {
    pub password: String,
}

/// Request payload for checking a password against a stored pair.
#[derive(Debug, Deserialize)]
pub struct VerifyPasswordRequest {
    pub password: String,
    pub salt: String,
    pub hash: String,
}

/// Verification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub valid: bool,
}
