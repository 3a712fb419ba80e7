//! Shared normalization helpers for identifier request fields.

use crate::AppError;
use pageguard_core::models::lock::ActorId;

/// Normalize an optional identifier.
///
/// Empty or whitespace-only values are treated as absent.
pub(super) fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Require a non-blank identifier for `field`.
pub(super) fn require_identifier(field: &str, value: Option<String>) -> Result<String, AppError> {
    normalize_optional(value).ok_or_else(|| AppError::BadRequest(format!("'{}' is required", field)))
}

/// Require a non-blank actor id.
pub(super) fn require_actor(value: Option<String>) -> Result<ActorId, AppError> {
    require_identifier("actor_id", value).map(ActorId::new)
}

#[cfg(test)]
mod tests {
    use super::{normalize_optional, require_actor, require_identifier};

    #[test]
    fn blank_values_normalize_to_none() {
        assert_eq!(normalize_optional(None), None);
        assert_eq!(normalize_optional(Some("  ".into())), None);
        assert_eq!(normalize_optional(Some(" 7 ".into())).as_deref(), Some("7"));
    }

    #[test]
    fn required_identifiers_reject_blank_values() {
        assert!(require_identifier("resource", Some("".into())).is_err());
        assert_eq!(
            require_actor(Some(" alice ".into())).expect("actor").as_str(),
            "alice"
        );
        let err = require_actor(None).expect_err("missing actor");
        assert!(err.to_string().contains("actor_id"));
    }
}
