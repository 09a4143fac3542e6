//! Migration steps: a version edge paired with the action that performs it.

use std::fmt;

/// Schema version number.
pub type Version = i32;

/// Error raised by a bootstrap or migration action.
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running a bootstrap or migration action.
pub type ActionResult = Result<(), ActionError>;

/// Boxed action invoked with the run's transactional context.
pub type Action<C> = Box<dyn Fn(&C) -> ActionResult + Send + Sync>;

/// An immutable step that moves a database from one version to another.
///
/// `C` is the transactional context handed to the action (for DuckDB, a
/// `duckdb::Connection` inside an open transaction). Whether the step is an
/// upgrade or a downgrade follows from the two versions.
pub struct Migration<C> {
    from_version: Version,
    to_version: Version,
    label: String,
    action: Action<C>,
}

impl<C> Migration<C> {
    /// Create a migration from `from_version` to `to_version`.
    ///
    /// The label defaults to `migrate_{from}_to_{to}`; use
    /// [`named`](Self::named) to give it a more descriptive one.
    pub fn new<F>(from_version: Version, to_version: Version, action: F) -> Self
    where
        F: Fn(&C) -> ActionResult + Send + Sync + 'static,
    {
        Self {
            from_version,
            to_version,
            label: default_label(from_version, to_version),
            action: Box::new(action),
        }
    }

    /// Replace the label recorded for this migration.
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Version the migration starts from
    pub fn from_version(&self) -> Version {
        self.from_version
    }

    /// Version the migration ends at
    pub fn to_version(&self) -> Version {
        self.to_version
    }

    /// Label written to the record store when this step is applied
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True when the step moves to a higher version
    pub fn is_upgrade(&self) -> bool {
        self.to_version > self.from_version
    }

    /// Run the migration action against `ctx`.
    pub fn run(&self, ctx: &C) -> ActionResult {
        (self.action)(ctx)
    }
}

fn default_label(from_version: Version, to_version: Version) -> String {
    format!("migrate_{from_version}_to_{to_version}")
}

impl<C> fmt::Debug for Migration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("from_version", &self.from_version)
            .field("to_version", &self.to_version)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<C> fmt::Display for Migration<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -> {})",
            self.label, self.from_version, self.to_version
        )
    }
}
