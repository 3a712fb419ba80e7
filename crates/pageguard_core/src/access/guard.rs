//! Referer and request-path allow-list decisions.

use super::path_matcher;
use crate::config::Config;
use std::collections::HashSet;
use std::fmt;

/// Outcome of an allow-list check.
///
/// A denial is a value, not an error; the HTTP layer decides how to respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    /// Whether the request may proceed.
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("allow"),
            Self::Deny => f.write_str("deny"),
        }
    }
}

/// Allow-list guard built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed_hosts: HashSet<String>,
    bypass_patterns: Option<Vec<String>>,
}

impl AccessGuard {
    /// Build a guard from an explicit host list and optional bypass patterns.
    pub fn new<I, S>(allowed_hosts: I, bypass_patterns: Option<Vec<String>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_hosts: allowed_hosts.into_iter().map(Into::into).collect(),
            bypass_patterns,
        }
    }

    /// Build a guard from the runtime configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.allowed_hosts.iter().cloned(),
            config.bypass_patterns.clone(),
        )
    }

    /// Decide whether a request may proceed.
    ///
    /// A present referer host must be an exact, case-sensitive member of the
    /// host allow-list. Without a referer the request path must match a
    /// bypass pattern; with no bypass list configured it is denied.
    ///
    /// # Arguments
    /// - `referer_host`: Host taken from the `Referer` header, if any.
    /// - `request_path`: Request URI or path.
    pub fn check_access(&self, referer_host: Option<&str>, request_path: &str) -> Decision {
        let decision = match referer_host {
            Some(host) => Decision::from_bool(self.allowed_hosts.contains(host)),
            None => match self.bypass_patterns.as_deref() {
                Some(patterns) => {
                    Decision::from_bool(path_matcher::matches(request_path, patterns))
                }
                None => Decision::Deny,
            },
        };

        if decision.is_allowed() {
            tracing::debug!(
                referer_host = referer_host.unwrap_or("-"),
                request_path,
                "access allowed"
            );
        } else {
            tracing::warn!(
                referer_host = referer_host.unwrap_or("-"),
                request_path,
                "access denied"
            );
        }
        decision
    }
}

/// Require a referer whose path matches one of `patterns`.
///
/// A missing referer is always denied.
pub fn check_referer<S: AsRef<str>>(referer: Option<&str>, patterns: &[S]) -> Decision {
    let Some(referer) = referer else {
        tracing::warn!("referer required but missing");
        return Decision::Deny;
    };
    let decision = Decision::from_bool(path_matcher::matches(referer, patterns));
    if !decision.is_allowed() {
        tracing::warn!(referer, "referer outside allowed patterns");
    }
    decision
}
