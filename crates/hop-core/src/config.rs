//! Configuration types and parsing for hopscotch.yml

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Version;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names looked up in a project directory, in order
pub const CONFIG_FILE_NAMES: [&str; 2] = ["hopscotch.yml", "hopscotch.yaml"];

/// Project configuration from hopscotch.yml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Version to migrate to (may be overridden on the command line)
    #[serde(default)]
    pub target_version: Option<Version>,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Directory holding `bootstrap.sql` and the migration scripts
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Table that stores migration history, optionally schema-qualified
    #[serde(default = "default_record_table")]
    pub record_table: String,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or `:memory:`)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "hopscotch.duckdb".to_string()
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

fn default_record_table() -> String {
    "migrations".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_version: None,
            database: DatabaseConfig::default(),
            migrations_dir: default_migrations_dir(),
            record_table: default_record_table(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> MigrateResult<Self> {
        if !path.exists() {
            return Err(MigrateError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for hopscotch.yml or hopscotch.yaml
    pub fn load_from_dir(dir: &Path) -> MigrateResult<Self> {
        match Self::find_in_dir(dir) {
            Some(path) => Self::load(&path),
            None => Err(MigrateError::ConfigNotFound {
                path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
            }),
        }
    }

    /// Path of the config file in `dir`, if one exists
    pub fn find_in_dir(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Migrations directory resolved against the project root
    pub fn migrations_dir_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_dir)
    }

    /// Database path resolved against the project root (`:memory:` is kept)
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.path == ":memory:" {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> MigrateResult<()> {
        if let Some(target) = self.target_version {
            if target < 0 {
                return Err(MigrateError::ConfigInvalid {
                    message: format!("target_version should not be negative, got <{target}>"),
                });
            }
        }

        if self.database.path.is_empty() {
            return Err(MigrateError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        if !is_valid_table_name(&self.record_table) {
            return Err(MigrateError::ConfigInvalid {
                message: format!(
                    "record_table '{}' must be an identifier or schema.identifier",
                    self.record_table
                ),
            });
        }

        Ok(())
    }
}

/// True for `ident` or `schema.ident` made of ASCII alphanumerics and
/// underscores, not starting with a digit.
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|part| is_identifier(part))
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
