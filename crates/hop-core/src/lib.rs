//! hop-core - Core library for Hopscotch
//!
//! This crate provides the migration model, the graph and greedy path
//! resolver that connect two schema versions, the [`Migrator`] that applies
//! a resolved path inside one transaction, and the collaborator traits a
//! database backend implements. It has no database dependency of its own.

pub mod config;
pub mod error;
pub mod graph;
pub mod migration;
pub mod migrator;
pub mod record;
pub mod resolver;
pub mod script;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{MigrateError, MigrateResult};
pub use graph::{MigrationGraph, OverrideNotice};
pub use migration::{Action, ActionError, ActionResult, Migration, Version};
pub use migrator::{AppliedStep, MigrationOutcome, Migrator};
pub use record::{
    MigrationRecord, MigrationRecordStore, NewMigrationRecord, Transactional, BOOTSTRAP_LABEL,
    MAX_LABEL_LEN,
};
pub use resolver::{resolve_path, Direction};
pub use script::{discover_scripts, MigrationScript, ScriptSet};
