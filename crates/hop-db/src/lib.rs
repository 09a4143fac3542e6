//! hop-db - DuckDB backend for Hopscotch
//!
//! Implements the `hop-core` collaborator traits on top of DuckDB:
//! [`MigrationDb`] opens transactions over a connection and
//! [`DuckDbRecordStore`] keeps migration history in a table. The [`script`]
//! module turns a directory of SQL files into a ready-to-run migrator.

pub mod connection;
pub mod error;
pub mod record_store;
pub mod script;

pub use connection::MigrationDb;
pub use error::{DbError, DbResult};
pub use record_store::{DuckDbRecordStore, DEFAULT_RECORD_TABLE};
pub use script::{migrator_from_dir, script_bootstrap, script_migration, script_migrator};
