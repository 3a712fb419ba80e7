//! Database layer for pageguard.

/// Page lock storage helpers.
pub mod page_lock;
/// redb table definitions.
pub mod tables;

use crate::constants::DEFAULT_LOCK_TTL_SECS;
use crate::error::AppError;
use chrono::Duration;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to the underlying redb tables.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub locks: page_lock::PageLockDb,
}


fn default_lock_ttl() -> Duration {
    Duration::seconds(DEFAULT_LOCK_TTL_SECS as i64)
}

impl Database {
    /// Open the database with the default lock TTL.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be prepared or redb cannot
    /// open the file.
    pub fn new(path: &str) -> Result<Self, AppError> {
        Self::with_lock_ttl(path, default_lock_ttl())
    }

    /// Open the database at `path` and initialize tables.
    ///
    /// `path` is a directory; the redb file lives inside it.
    ///
    /// # Arguments
    /// - `path`: Database directory.
    /// - `lock_ttl`: Lifetime given to acquired page locks.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns an error if the directory cannot be prepared, another process
    /// holds the file, or table initialization fails.
    pub fn with_lock_ttl(path: &str, lock_ttl: Duration) -> Result<Self, AppError> {
        let root = Path::new(path);
        std::fs::create_dir_all(root).map_err(|err| {
            AppError::StorageMessage(format!(
                "Failed to create database directory '{}': {}",
                root.display(),
                err
            ))
        })?;

        let file = root.join(tables::REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageMessage(format!(
                    "Database '{}' is already open in another pageguard process.\n\
                    Stop it first, or set DB_PATH to use a different database location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::debug!("Opened page lock database at {}", file.display());
        Self::from_shared(db, lock_ttl)
    }

    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the required tables cannot be opened.
    pub fn from_shared(db: Arc<redb::Database>, lock_ttl: Duration) -> Result<Self, AppError> {
        Ok(Self {
            locks: page_lock::PageLockDb::new(db.clone(), lock_ttl)?,
            db,
        })
    }

    /// Clone this handle for another subsystem in the same process.
    ///
    /// Avoids reopening the file, which redb rejects while it is open.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone(), self.locks.ttl())
    }
}
