//! Shared constants used across pageguard crates.

/// Default API port for pageguard.
pub const DEFAULT_PORT: u16 = 38420;

/// Default lifetime of a page lock, in seconds.
pub const DEFAULT_LOCK_TTL_SECS: u64 = 300;

/// Upper bound applied to configured lock lifetimes (one year).
pub const MAX_LOCK_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Number of random bytes drawn for a credential salt.
pub const SALT_BYTES: usize = 32;

/// Wildcard segment accepted in path patterns.
pub const WILDCARD_SEGMENT: &str = "*";

/// File name for the redb database within the configured DB directory.
pub const REDB_FILE_NAME: &str = "data.redb";
