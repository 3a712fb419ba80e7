//! redb table definitions shared by storage modules.

use redb::TableDefinition;

pub use crate::constants::REDB_FILE_NAME;

/// Page lock rows (`LockRecord`, bincode-encoded) keyed by `(resource, resource_id)`.
pub const PAGE_LOCKS: TableDefinition<(&str, i64), &[u8]> =
    TableDefinition::new("system_lock_pages");
