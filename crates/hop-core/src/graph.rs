//! In-memory index of migrations keyed by source version.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, Version};
use crate::record::MAX_LABEL_LEN;
use crate::resolver;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Emitted when a registration replaces an existing (from, to) edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideNotice {
    pub from_version: Version,
    pub to_version: Version,
    /// Label of the migration that was dropped
    pub replaced: String,
    /// Label of the migration that now owns the edge
    pub replacement: String,
}

impl fmt::Display for OverrideNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Overriding migration {} with {} ({} -> {})",
            self.replaced, self.replacement, self.from_version, self.to_version
        )
    }
}

type OverrideHook<'a> = Box<dyn FnMut(&OverrideNotice) + 'a>;

/// Migrations indexed as `from_version -> (to_version -> migration)`.
///
/// Target versions are kept ordered so the resolver can scan toward a goal
/// in either direction. The graph borrows the migrations it indexes.
pub struct MigrationGraph<'a, C> {
    edges: HashMap<Version, BTreeMap<Version, &'a Migration<C>>>,
    on_override: OverrideHook<'a>,
}

impl<'a, C> MigrationGraph<'a, C> {
    /// Create an empty graph that logs override notices as warnings
    pub fn new() -> Self {
        Self::with_override_hook(|notice| log::warn!("{notice}"))
    }

    /// Create an empty graph that reports override notices to `hook`
    pub fn with_override_hook<F>(hook: F) -> Self
    where
        F: FnMut(&OverrideNotice) + 'a,
    {
        Self {
            edges: HashMap::new(),
            on_override: Box::new(hook),
        }
    }

    /// Build a graph from `migrations`, registering them in order
    pub fn build<I>(migrations: I) -> MigrateResult<Self>
    where
        I: IntoIterator<Item = &'a Migration<C>>,
    {
        let mut graph = Self::new();
        graph.register_all(migrations)?;
        Ok(graph)
    }

    /// Add a migration, replacing any existing one for the same edge.
    ///
    /// Self-loops (`from == to`) and labels that cannot be recorded are
    /// rejected.
    pub fn register(&mut self, migration: &'a Migration<C>) -> MigrateResult<()> {
        validate(migration)?;

        let targets = self.edges.entry(migration.from_version()).or_default();
        if let Some(existing) = targets.insert(migration.to_version(), migration) {
            let notice = OverrideNotice {
                from_version: migration.from_version(),
                to_version: migration.to_version(),
                replaced: existing.label().to_string(),
                replacement: migration.label().to_string(),
            };
            (self.on_override)(&notice);
        }
        Ok(())
    }

    /// Register every migration in input order, so later duplicates win
    pub fn register_all<I>(&mut self, migrations: I) -> MigrateResult<()>
    where
        I: IntoIterator<Item = &'a Migration<C>>,
    {
        for migration in migrations {
            self.register(migration)?;
        }
        Ok(())
    }

    /// Migration registered for the `from -> to` edge
    pub fn get(&self, from: Version, to: Version) -> Option<&'a Migration<C>> {
        self.edges.get(&from).and_then(|t| t.get(&to)).copied()
    }

    /// Ordered outgoing edges of `from`
    pub fn targets_from(&self, from: Version) -> Option<&BTreeMap<Version, &'a Migration<C>>> {
        self.edges.get(&from)
    }

    /// Number of distinct edges
    pub fn len(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// True when no migration is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the ordered steps from `start` to `end`.
    ///
    /// See [`resolver::resolve_path`].
    pub fn resolve_path(&self, start: Version, end: Version) -> MigrateResult<Vec<&'a Migration<C>>> {
        resolver::resolve_path(self, start, end)
    }
}

impl<C> Default for MigrationGraph<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for MigrationGraph<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationGraph")
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

/// Reject migrations the graph cannot hold: self-loops and labels that
/// cannot be recorded.
pub(crate) fn validate<C>(migration: &Migration<C>) -> MigrateResult<()> {
    let label = migration.label();
    let reason = if migration.from_version() == migration.to_version() {
        format!(
            "source and target version are both {}",
            migration.from_version()
        )
    } else if label.is_empty() {
        "label must not be empty".to_string()
    } else if label.chars().count() > MAX_LABEL_LEN {
        format!("label is longer than {MAX_LABEL_LEN} characters")
    } else {
        return Ok(());
    };

    Err(MigrateError::InvalidMigration {
        label: label.to_string(),
        reason,
    })
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
