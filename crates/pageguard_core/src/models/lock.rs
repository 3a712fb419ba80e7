//! Page lock data models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the actor (user) acquiring or holding a lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Construct an actor id from a caller-provided identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Return this actor id as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the page lock table, keyed by `(resource, resource_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub resource: String,
    pub resource_id: i64,
    pub locked_by: ActorId,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LockRecord {
    /// Build a fresh record held by `actor` from `now` until `now + ttl`.
    pub fn new(
        resource: &str,
        resource_id: i64,
        actor: &ActorId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            resource: resource.to_string(),
            resource_id,
            locked_by: actor.clone(),
            locked_at: now,
            expires_at: now + ttl,
        }
    }

    /// A record is expired once `expires_at` lies strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whether `actor` holds this record.
    pub fn is_held_by(&self, actor: &ActorId) -> bool {
        &self.locked_by == actor
    }
}

/// Result of an acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "lock", rename_all = "snake_case")]
pub enum AcquireOutcome {
    /// The caller now holds the lock described by the record.
    Acquired(LockRecord),
    /// Another actor holds a live lock; the record names the holder.
    Denied(LockRecord),
}

impl AcquireOutcome {
    /// Whether the lock was acquired.
    pub fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired(_))
    }

    /// The record written (acquired) or the blocking record (denied).
    pub fn record(&self) -> &LockRecord {
        match self {
            Self::Acquired(record) | Self::Denied(record) => record,
        }
    }
}

/// Result of an ownership-checked release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "lock", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released,
    NotLocked,
    /// A live lock exists but belongs to someone else; nothing was deleted.
    HeldByOther(LockRecord),
}

/// Request payload for acquiring a page lock.
#[derive(Debug, Deserialize)]
pub struct AcquireLockRequest {
    pub actor_id: String,
}

/// Query parameters for releasing a page lock.
#[derive(Debug, Default, Deserialize)]
pub struct ReleaseLockQuery {
    pub actor_id: Option<String>,
    /// Skip the holder check and delete unconditionally.
    pub force: Option<bool>,
}
