//! Advisory page locks backed by redb.
//!
//! Each `(resource, resource_id)` pair holds at most one live
//! [`LockRecord`]. Lookups and writes for an acquisition run inside a single
//! write transaction; redb admits one writer at a time, so two concurrent
//! acquisitions for the same key cannot both observe an empty slot.

use crate::{db::tables::PAGE_LOCKS, error::AppError, models::lock::*};
use chrono::{DateTime, Duration, Utc};
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

fn decode_record(bytes: &[u8]) -> Result<LockRecord, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Accessor for the page lock table.
pub struct PageLockDb {
    db: Arc<redb::Database>,
    ttl: Duration,
}

impl PageLockDb {
    /// Initialize the lock table if it does not exist yet.
    ///
    /// # Arguments
    /// - `db`: Shared redb handle.
    /// - `ttl`: Lifetime given to every acquired lock.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>, ttl: Duration) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(PAGE_LOCKS)?;
        write_txn.commit()?;
        Ok(Self { db, ttl })
    }

    /// Lifetime applied to newly written locks.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Delete every lock whose `expires_at` lies before `now`.
    ///
    /// Rows that fail to decode are deleted too. Running it again with the
    /// same `now` removes nothing.
    ///
    /// # Returns
    /// Number of rows removed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(PAGE_LOCKS)?;
            let mut expired = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let (resource, resource_id) = key.value();
                let stale = match decode_record(value.value()) {
                    Ok(record) => record.is_expired(now),
                    Err(err) => {
                        tracing::warn!(
                            "Dropping undecodable page lock {}/{}: {}",
                            resource,
                            resource_id,
                            err
                        );
                        true
                    }
                };
                if stale {
                    expired.push((resource.to_string(), resource_id));
                }
            }
            for (resource, resource_id) in &expired {
                table.remove((resource.as_str(), *resource_id))?;
            }
            expired.len()
        };
        write_txn.commit()?;

        if removed > 0 {
            tracing::debug!("Swept {} expired page lock(s)", removed);
        }
        Ok(removed)
    }

    /// Try to lock `(resource, resource_id)` for `actor`.
    ///
    /// Expired rows are swept first; a sweep failure is logged and does not
    /// block the attempt. A missing, expired, or self-held lock is
    /// (re)written with a fresh TTL. A live lock held by someone else is
    /// left untouched and reported back.
    ///
    /// # Returns
    /// [`AcquireOutcome::Acquired`] with the new row, or
    /// [`AcquireOutcome::Denied`] with the current holder's row.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn try_acquire(
        &self,
        resource: &str,
        resource_id: i64,
        actor: &ActorId,
        now: DateTime<Utc>,
    ) -> Result<AcquireOutcome, AppError> {
        if let Err(err) = self.sweep_expired(now) {
            tracing::warn!("Expired page lock sweep failed: {}", err);
        }

        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(PAGE_LOCKS)?;
            let existing = match table.get((resource, resource_id))? {
                Some(guard) => Some(decode_record(guard.value())?),
                None => None,
            };

            match existing {
                Some(current) if !current.is_expired(now) && !current.is_held_by(actor) => {
                    AcquireOutcome::Denied(current)
                }
                _ => {
                    let record = LockRecord::new(resource, resource_id, actor, now, self.ttl);
                    let encoded = bincode::serialize(&record)?;
                    table.insert((resource, resource_id), encoded.as_slice())?;
                    AcquireOutcome::Acquired(record)
                }
            }
        };
        write_txn.commit()?;

        match &outcome {
            AcquireOutcome::Acquired(record) => tracing::info!(
                "Page lock {}/{} acquired by {} until {}",
                resource,
                resource_id,
                actor,
                record.expires_at
            ),
            AcquireOutcome::Denied(record) => tracing::info!(
                "Page lock {}/{} denied to {}: held by {}",
                resource,
                resource_id,
                actor,
                record.locked_by
            ),
        }
        Ok(outcome)
    }

    /// Delete the lock for `(resource, resource_id)` regardless of holder.
    ///
    /// This is the privileged path; use [`Self::release_held`] to release on
    /// behalf of a specific actor.
    ///
    /// # Returns
    /// `true` if a row was deleted.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn release(&self, resource: &str, resource_id: i64) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(PAGE_LOCKS)?;
            let removed = table.remove((resource, resource_id))?.is_some();
            removed
        };
        write_txn.commit()?;

        if removed {
            tracing::info!("Page lock {}/{} released", resource, resource_id);
        }
        Ok(removed)
    }

    /// Release the lock only if `actor` is its live holder.
    ///
    /// An expired row is deleted and reported as [`ReleaseOutcome::NotLocked`].
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn release_held(
        &self,
        resource: &str,
        resource_id: i64,
        actor: &ActorId,
        now: DateTime<Utc>,
    ) -> Result<ReleaseOutcome, AppError> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(PAGE_LOCKS)?;
            let existing = match table.get((resource, resource_id))? {
                Some(guard) => Some(decode_record(guard.value())?),
                None => None,
            };

            match existing {
                None => ReleaseOutcome::NotLocked,
                Some(current) if current.is_expired(now) => {
                    table.remove((resource, resource_id))?;
                    ReleaseOutcome::NotLocked
                }
                Some(current) if current.is_held_by(actor) => {
                    table.remove((resource, resource_id))?;
                    ReleaseOutcome::Released
                }
                Some(current) => ReleaseOutcome::HeldByOther(current),
            }
        };
        write_txn.commit()?;

        match &outcome {
            ReleaseOutcome::Released => {
                tracing::info!("Page lock {}/{} released by {}", resource, resource_id, actor)
            }
            ReleaseOutcome::HeldByOther(record) => tracing::warn!(
                "Release of page lock {}/{} by {} refused: held by {}",
                resource,
                resource_id,
                actor,
                record.locked_by
            ),
            ReleaseOutcome::NotLocked => {}
        }
        Ok(outcome)
    }

    /// Fetch the live lock for `(resource, resource_id)`.
    ///
    /// # Returns
    /// `Ok(None)` when no row exists or the row has expired.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get_live(
        &self,
        resource: &str,
        resource_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<LockRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAGE_LOCKS)?;
        let record = match table.get((resource, resource_id))? {
            Some(guard) => decode_record(guard.value())?,
            None => return Ok(None),
        };
        Ok((!record.is_expired(now)).then_some(record))
    }

    /// List all live locks ordered by `(resource, resource_id)`.
    ///
    /// Rows that fail to decode are skipped.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<LockRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PAGE_LOCKS)?;
        let mut records = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            match decode_record(value.value()) {
                Ok(record) if !record.is_expired(now) => records.push(record),
                Ok(_) => {}
                Err(err) => {
                    let (resource, resource_id) = key.value();
                    tracing::warn!(
                        "Skipping undecodable page lock {}/{}: {}",
                        resource,
                        resource_id,
                        err
                    );
                }
            }
        }
        Ok(records)
    }
}
