//! Applied-migration records and the collaborator traits the runner needs.
//!
//! The runner never talks to a database directly. It opens transactions
//! through a [`Transactional`] implementation and reads or writes history
//! through a [`MigrationRecordStore`] sharing the same context type.

use crate::error::MigrateResult;
use crate::migration::Version;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Longest label the record store accepts
pub const MAX_LABEL_LEN: usize = 256;

/// Label recorded for the bootstrap step
pub const BOOTSTRAP_LABEL: &str = "bootstrap";

/// A persisted row of migration history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationRecord {
    /// Store-assigned identifier, increasing with insertion order
    pub id: i64,
    pub version: Version,
    pub label: String,
    pub applied_at: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub successful: bool,
}

/// A record about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMigrationRecord {
    pub version: Version,
    pub label: String,
    pub applied_at: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub successful: bool,
}

impl NewMigrationRecord {
    /// A successful record stamped with the current time
    pub fn success(version: Version, label: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            version,
            label: label.into(),
            applied_at: Utc::now(),
            execution_time_ms,
            successful: true,
        }
    }
}

/// Opens transactional scopes over a database.
pub trait Transactional {
    /// Handle passed to everything executed inside the scope
    type Context;

    /// Run `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok` and rolls back when it returns
    /// `Err`, returning the body's error unchanged.
    fn transaction<T, F>(&self, body: F) -> MigrateResult<T>
    where
        F: FnOnce(&Self::Context) -> MigrateResult<T>;
}

/// Persists one record per applied bootstrap or migration step.
pub trait MigrationRecordStore {
    /// Context the store reads and writes through
    type Context;

    /// Create the record table if it does not exist yet
    fn ensure_table(&self, ctx: &Self::Context) -> MigrateResult<()>;

    /// Version of the most recently inserted successful record
    fn latest_successful_version(&self, ctx: &Self::Context) -> MigrateResult<Option<Version>>;

    /// Append a record
    fn insert_record(&self, ctx: &Self::Context, record: &NewMigrationRecord) -> MigrateResult<()>;

    /// All records in insertion order
    fn records(&self, ctx: &Self::Context) -> MigrateResult<Vec<MigrationRecord>>;
}
