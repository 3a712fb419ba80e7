//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_LOCK_TTL_SECS, DEFAULT_PORT, MAX_LOCK_TTL_SECS};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for pageguard.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub port: u16,
    pub lock_ttl_secs: u64,
    /// Referer hosts accepted by the access guard.
    pub allowed_hosts: Vec<String>,
    /// Path patterns that admit requests without a referer. `None` denies them.
    pub bypass_patterns: Option<Vec<String>>,
    /// Referer path patterns required on credential routes, when set.
    pub referer_patterns: Option<Vec<String>>,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Split a comma-separated list value.
///
/// Items are trimmed and empty items are dropped.
pub fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read an optional list from the environment.
///
/// # Returns
/// `None` when the variable is unset or holds no items.
pub fn env_list(name: &str) -> Option<Vec<String>> {
    let items = parse_env_list(&env::var(name).ok()?);
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
                let cache_dir = home.join(".cache").join("pageguard");
                cache_dir.join("db").to_string_lossy().to_string()
            }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            lock_ttl_secs: env::var("LOCK_TTL_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(DEFAULT_LOCK_TTL_SECS),
            allowed_hosts: env_list("ALLOWED_HOSTS").unwrap_or_default(),
            bypass_patterns: env_list("BYPASS_PATTERNS"),
            referer_patterns: env_list("REFERER_PATTERNS"),
        }
    }

    /// Lock TTL as a chrono duration, capped at [`MAX_LOCK_TTL_SECS`].
    pub fn lock_ttl(&self) -> chrono::Duration {
        let secs = self.lock_ttl_secs.min(MAX_LOCK_TTL_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(0))
    }
}
