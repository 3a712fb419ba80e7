//! Core domain library for pageguard (access guard, credentials, page locks).

/// Referer and request-path allow-listing.
pub mod access;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Salted credential hashing.
pub mod credentials;
/// Database access layer.
pub mod db;
/// Scoped environment overrides.
pub mod env;
/// Application error types (storage/domain).
pub mod error;
/// Data models for API requests and persistence.
pub mod models;

#[cfg(test)]
mod test_support;

pub use access::{AccessGuard, Decision};
pub use config::Config;
pub use constants::*;
pub use db::Database;
pub use error::AppError;
