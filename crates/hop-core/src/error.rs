//! Error types for hop-core

use crate::migration::{ActionError, Version};
use thiserror::Error;

/// Core error type for Hopscotch
#[derive(Error, Debug)]
pub enum MigrateError {
    /// MIG001: Target version cannot be migrated to
    #[error("[MIG001] Invalid target version <{version}>: {reason}")]
    InvalidTarget { version: Version, reason: String },

    /// MIG002: No chain of registered migrations connects the two versions
    #[error("[MIG002] Missing migration(s) [{from} -> {to}]: nothing leaves version {stalled_at} toward {to}")]
    MissingPath {
        from: Version,
        to: Version,
        stalled_at: Version,
    },

    /// MIG003: Migration rejected at registration
    #[error("[MIG003] Invalid migration '{label}': {reason}")]
    InvalidMigration { label: String, reason: String },

    /// A bootstrap or migration action failed.
    ///
    /// The action's own error is carried as-is: `Display` and `source()` are
    /// forwarded, and it can be recovered with `downcast_ref`.
    #[error(transparent)]
    Action(ActionError),

    /// MIG004: Record store failure
    #[error("[MIG004] Migration record store failed: {0}")]
    Store(String),

    /// MIG005: Transaction management failure
    #[error("[MIG005] Migration transaction failed: {0}")]
    Transaction(String),

    /// MIG006: Configuration file not found
    #[error("[MIG006] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// MIG007: Invalid configuration value
    #[error("[MIG007] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// MIG008: Configuration YAML could not be parsed
    #[error("[MIG008] Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// MIG009: IO error with file path context
    #[error("[MIG009] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// MIG010: SQL migration script that does not follow the naming scheme
    #[error("[MIG010] Invalid migration script '{path}': {reason}")]
    InvalidScript { path: String, reason: String },
}

impl MigrateError {
    /// Borrow the underlying action error, if this is an action failure.
    pub fn as_action_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            MigrateError::Action(err) => Some(&**err),
            _ => None,
        }
    }
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
