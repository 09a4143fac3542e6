//! Migration runner: bootstraps a fresh database or walks it to a target
//! version, recording every applied step.

use crate::error::{MigrateError, MigrateResult};
use crate::graph::{self, MigrationGraph, OverrideNotice};
use crate::migration::{Action, ActionResult, Migration, Version};
use crate::record::{MigrationRecordStore, NewMigrationRecord, Transactional, BOOTSTRAP_LABEL};
use serde::Serialize;
use std::fmt;
use std::time::Instant;

type OverrideCallback = Box<dyn Fn(&OverrideNotice) + Send + Sync>;

/// One migration applied during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedStep {
    pub from_version: Version,
    pub to_version: Version,
    pub label: String,
    pub execution_time_ms: u64,
}

/// What a call to [`Migrator::apply_migrations`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// No history existed; the bootstrap ran and the target became the baseline
    Bootstrapped {
        version: Version,
        execution_time_ms: u64,
    },
    /// The database was already at the target version
    UpToDate { version: Version },
    /// One or more migrations were applied
    Migrated {
        from_version: Version,
        to_version: Version,
        steps: Vec<AppliedStep>,
    },
}

impl MigrationOutcome {
    /// Version the database is at after the run
    pub fn version(&self) -> Version {
        match self {
            MigrationOutcome::Bootstrapped { version, .. } => *version,
            MigrationOutcome::UpToDate { version } => *version,
            MigrationOutcome::Migrated { to_version, .. } => *to_version,
        }
    }
}

impl fmt::Display for MigrationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOutcome::Bootstrapped {
                version,
                execution_time_ms,
            } => write!(f, "bootstrapped at version {version} ({execution_time_ms}ms)"),
            MigrationOutcome::UpToDate { version } => {
                write!(f, "no migration to apply, already at version {version}")
            }
            MigrationOutcome::Migrated {
                from_version,
                to_version,
                steps,
            } => write!(
                f,
                "migrated from version {from_version} to {to_version} in {} step(s)",
                steps.len()
            ),
        }
    }
}

/// Brings a database to `target_version`.
///
/// A run either bootstraps (no history yet) or resolves a path from the
/// latest recorded version and applies it. All steps of a run share one
/// transaction, so a failing step leaves neither schema changes nor records
/// from that run behind.
pub struct Migrator<C> {
    target_version: Version,
    bootstrap: Action<C>,
    migrations: Vec<Migration<C>>,
    override_hook: Option<OverrideCallback>,
}

impl<C> Migrator<C> {
    /// Create a migrator.
    ///
    /// `bootstrap` runs exactly once, on a database without history, and
    /// must leave it at `target_version`. Fails if the target is negative or
    /// if any migration is a self-loop or carries an unrecordable label.
    pub fn new<F>(
        target_version: Version,
        bootstrap: F,
        migrations: Vec<Migration<C>>,
    ) -> MigrateResult<Self>
    where
        F: Fn(&C) -> ActionResult + Send + Sync + 'static,
    {
        if target_version < 0 {
            return Err(MigrateError::InvalidTarget {
                version: target_version,
                reason: "version should not be negative".to_string(),
            });
        }
        for migration in &migrations {
            graph::validate(migration)?;
        }

        Ok(Self {
            target_version,
            bootstrap: Box::new(bootstrap),
            migrations,
            override_hook: None,
        })
    }

    /// Report duplicate (from, to) registrations to `hook` instead of the log
    pub fn with_override_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&OverrideNotice) + Send + Sync + 'static,
    {
        self.override_hook = Some(Box::new(hook));
        self
    }

    /// Version this migrator brings the database to
    pub fn target_version(&self) -> Version {
        self.target_version
    }

    /// Registered migrations, in registration order
    pub fn migrations(&self) -> &[Migration<C>] {
        &self.migrations
    }

    /// Index the registered migrations into a fresh graph
    pub fn graph(&self) -> MigrateResult<MigrationGraph<'_, C>> {
        let mut graph = match &self.override_hook {
            Some(hook) => MigrationGraph::with_override_hook(move |notice| hook(notice)),
            None => MigrationGraph::new(),
        };
        graph.register_all(&self.migrations)?;
        Ok(graph)
    }

    /// Steps that would bring a database at `current_version` to the target,
    /// without running anything.
    pub fn plan(&self, current_version: Version) -> MigrateResult<Vec<&Migration<C>>> {
        self.graph()?
            .resolve_path(current_version, self.target_version)
    }

    /// Run the migrator against `db`, recording history through `store`.
    pub fn apply_migrations<D, S>(&self, db: &D, store: &S) -> MigrateResult<MigrationOutcome>
    where
        D: Transactional<Context = C>,
        S: MigrationRecordStore<Context = C>,
    {
        db.transaction(|ctx| store.ensure_table(ctx))?;

        db.transaction(|ctx| match store.latest_successful_version(ctx)? {
            None => self.bootstrap_in(ctx, store),
            Some(current) => self.migrate_from(ctx, store, current),
        })
    }

    fn bootstrap_in<S>(&self, ctx: &C, store: &S) -> MigrateResult<MigrationOutcome>
    where
        S: MigrationRecordStore<Context = C>,
    {
        log::info!(
            "No migration history found, bootstrapping at version {}",
            self.target_version
        );

        let start = Instant::now();
        if let Err(err) = (self.bootstrap)(ctx) {
            log::error!("Bootstrap failed: {err}");
            return Err(MigrateError::Action(err));
        }
        let execution_time_ms = elapsed_ms(start);

        store.insert_record(
            ctx,
            &NewMigrationRecord::success(self.target_version, BOOTSTRAP_LABEL, execution_time_ms),
        )?;

        Ok(MigrationOutcome::Bootstrapped {
            version: self.target_version,
            execution_time_ms,
        })
    }

    fn migrate_from<S>(
        &self,
        ctx: &C,
        store: &S,
        current: Version,
    ) -> MigrateResult<MigrationOutcome>
    where
        S: MigrationRecordStore<Context = C>,
    {
        let graph = self.graph()?;
        let path = graph.resolve_path(current, self.target_version)?;

        if path.is_empty() {
            log::info!("No migration to apply, already at version {current}");
            return Ok(MigrationOutcome::UpToDate { version: current });
        }

        log::info!(
            "Migrating from version {current} to {} in {} step(s)",
            self.target_version,
            path.len()
        );

        let mut steps = Vec::with_capacity(path.len());
        for migration in path {
            log::debug!("Applying {migration}");

            let start = Instant::now();
            if let Err(err) = migration.run(ctx) {
                log::error!("Migration {migration} failed, rolling back run: {err}");
                return Err(MigrateError::Action(err));
            }
            let execution_time_ms = elapsed_ms(start);

            store.insert_record(
                ctx,
                &NewMigrationRecord::success(
                    migration.to_version(),
                    migration.label(),
                    execution_time_ms,
                ),
            )?;

            steps.push(AppliedStep {
                from_version: migration.from_version(),
                to_version: migration.to_version(),
                label: migration.label().to_string(),
                execution_time_ms,
            });
        }

        Ok(MigrationOutcome::Migrated {
            from_version: current,
            to_version: self.target_version,
            steps,
        })
    }
}

impl<C> fmt::Debug for Migrator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migrator")
            .field("target_version", &self.target_version)
            .field("migrations", &self.migrations)
            .finish_non_exhaustive()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
