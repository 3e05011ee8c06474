//! Service layer for catalog, rule, and violation persistence.
//!
//! `WardenService` wraps `WardenDb` (raw database access). All repo methods
//! are implemented as `impl WardenService` blocks under `repos/`.

use crate::WardenDb;
use crate::error::DatabaseError;

pub struct WardenService {
    db: WardenDb,
}

impl WardenService {
    /// Create a new service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = WardenDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `WardenDb`.
    #[must_use]
    pub const fn from_db(db: WardenDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &WardenDb {
        &self.db
    }
}
