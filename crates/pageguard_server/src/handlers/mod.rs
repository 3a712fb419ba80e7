//! HTTP request handlers.

/// Credential hashing endpoints.
pub mod credentials;
/// Page lock endpoints.
pub mod lock;
pub(crate) mod normalize;
