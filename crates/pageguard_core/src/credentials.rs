//! Salted password hashing.
//!
//! The digest is a single SHA-256 round over `password ++ salt`, kept for
//! compatibility with hashes already stored by existing callers. It is not
//! resistant to offline brute force; a deployment that needs that should
//! switch to a memory-hard password hash, which changes stored formats.

use crate::constants::SALT_BYTES;
use crate::error::AppError;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Salt and digest pair handed to the caller for storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialHash {
    pub hash: String,
    pub salt: String,
}

impl CredentialHash {
    /// Draw a fresh salt and hash `password` with it.
    ///
    /// # Errors
    /// Returns [`AppError::RandomnessUnavailable`] when the OS random source
    /// fails.
    pub fn derive(password: &str) -> Result<Self, AppError> {
        let salt = create_salt()?;
        let hash = create_hash(password, &salt);
        Ok(Self { hash, salt })
    }

    /// Check `password` against this pair in constant time.
    pub fn verify(&self, password: &str) -> bool {
        verify_hash(password, &self.salt, &self.hash)
    }
}

/// Generate a hex-encoded salt from 32 bytes of OS randomness.
///
/// # Returns
/// A 64 character lowercase hex string.
///
/// # Errors
/// Returns [`AppError::RandomnessUnavailable`] when the OS random source
/// fails. There is no fallback source.
pub fn create_salt() -> Result<String, AppError> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.try_fill_bytes(&mut bytes).map_err(|err| {
        tracing::error!("OS random source failed while creating salt: {}", err);
        AppError::RandomnessUnavailable(err.to_string())
    })?;
    Ok(hex::encode(bytes))
}

/// Hex SHA-256 digest of `password` followed by `salt`.
pub fn create_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recompute the digest and compare it to `expected_hash` in constant time.
pub fn verify_hash(password: &str, salt: &str, expected_hash: &str) -> bool {
    let actual = create_hash(password, salt);
    actual.as_bytes().ct_eq(expected_hash.as_bytes()).into()
}
