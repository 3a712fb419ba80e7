//! Data models for API requests and persistence.

/// Credential request/response payloads.
pub mod credential;
/// Page lock rows and outcomes.
pub mod lock;
