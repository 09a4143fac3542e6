//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use hop_core::{Config, MigrationRecordStore, Transactional, Version};
use hop_db::{DuckDbRecordStore, MigrationDb};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Everything a command needs to talk to the project's database.
pub(crate) struct ProjectContext {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
    pub(crate) db: MigrationDb,
    pub(crate) store: DuckDbRecordStore,
}

impl ProjectContext {
    /// Load config, open the database and set up the record store.
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let config = load_config(&root, global)?;

        let db_path = match &global.database {
            Some(path) => path.clone(),
            None => config.database_path_absolute(&root),
        };
        log::debug!("Opening database {db_path}");
        let db = MigrationDb::new(&db_path)
            .with_context(|| format!("Failed to open database: {db_path}"))?;
        let store = DuckDbRecordStore::new(&config.record_table)
            .context("Invalid record table")?;

        Ok(Self {
            root,
            config,
            db,
            store,
        })
    }

    /// Directory holding the SQL scripts
    pub(crate) fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_dir_absolute(&self.root)
    }

    /// Create the history table if it does not exist yet.
    pub(crate) fn ensure_history(&self) -> Result<()> {
        self.db
            .transaction(|conn| self.store.ensure_table(conn))
            .context("Failed to prepare migration history table")
    }

    /// Latest successful version, creating the history table if needed.
    pub(crate) fn current_version(&self) -> Result<Option<Version>> {
        self.ensure_history()?;
        let version = self
            .db
            .transaction(|conn| self.store.latest_successful_version(conn))
            .context("Failed to read current version")?;
        Ok(version)
    }

    /// Target from the command line, falling back to `target_version` in config.
    pub(crate) fn target_version(&self, cli_target: Option<Version>) -> Result<Version> {
        match cli_target.or(self.config.target_version) {
            Some(target) if target < 0 => {
                bail!("Target version should not be negative, got <{target}>")
            }
            Some(target) => Ok(target),
            None => bail!(
                "No target version: pass --target or set target_version in the project config"
            ),
        }
    }
}

/// Load the project config.
///
/// An explicit `--config` path must exist. Without one, a missing
/// `hopscotch.yml` means the defaults are used.
fn load_config(root: &Path, global: &GlobalArgs) -> Result<Config> {
    if let Some(path) = &global.config {
        return Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config: {path}"));
    }

    match Config::find_in_dir(root) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => {
            log::debug!("No config file in {}, using defaults", root.display());
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
