//! SQL migration scripts discovered from a directory.
//!
//! A migrations directory holds an optional `bootstrap.sql` plus one file
//! per step named `{from}_to_{to}.sql` or `{from}_to_{to}_{name}.sql`.
//! The file stem becomes the migration label. Two files for the same
//! `{from}_to_{to}` edge (for example `1_to_2.sql` and `1_to_2_fix.sql`) are
//! rejected, since neither can be said to replace the other.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::Version;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// File name of the bootstrap script
pub const BOOTSTRAP_FILE: &str = "bootstrap.sql";

/// A single migration script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    pub from_version: Version,
    pub to_version: Version,
    /// File stem, recorded as the migration label
    pub label: String,
    pub path: PathBuf,
    pub sql: String,
}

/// Everything found in a migrations directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSet {
    /// Contents of `bootstrap.sql`, if present
    pub bootstrap: Option<String>,
    /// Step scripts sorted by file name
    pub scripts: Vec<MigrationScript>,
}

impl MigrationScript {
    /// Load a script, deriving its versions from the file name
    pub fn from_file(path: PathBuf) -> MigrateResult<Self> {
        let label = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| invalid(&path, "file name is not valid UTF-8"))?
            .to_string();

        let (from_version, to_version) =
            parse_versions(&label).map_err(|reason| invalid(&path, &reason))?;

        let sql = read(&path)?;
        Ok(Self {
            from_version,
            to_version,
            label,
            path,
            sql,
        })
    }
}

/// Split `{from}_to_{to}[_name]` into its two versions.
///
/// The error is the reason the stem was refused.
pub fn parse_versions(stem: &str) -> Result<(Version, Version), String> {
    let malformed = || "expected {from}_to_{to}[_name].sql".to_string();

    let (from, rest) = stem.split_once("_to_").ok_or_else(malformed)?;
    let to = match rest.split_once('_') {
        Some((to, name)) if !name.is_empty() => to,
        Some(_) => return Err(malformed()),
        None => rest,
    };
    if !is_digits(from) || !is_digits(to) {
        return Err(malformed());
    }
    Ok((parse_version(from)?, parse_version(to)?))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_version(digits: &str) -> Result<Version, String> {
    digits
        .parse()
        .map_err(|_| format!("version {digits} is out of range (max {})", Version::MAX))
}

/// Discover the bootstrap and step scripts in `dir`.
///
/// Only `.sql` files directly inside `dir` are considered; any `.sql` file
/// other than `bootstrap.sql` must follow the step naming scheme. A missing
/// directory yields an empty set.
pub fn discover_scripts(dir: &Path) -> MigrateResult<ScriptSet> {
    let mut set = ScriptSet::default();
    if !dir.exists() {
        log::debug!("Migrations directory {} does not exist", dir.display());
        return Ok(set);
    }

    let entries = std::fs::read_dir(dir).map_err(|e| MigrateError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }

        if path.file_name().and_then(|n| n.to_str()) == Some(BOOTSTRAP_FILE) {
            set.bootstrap = Some(read(&path)?);
        } else {
            set.scripts.push(MigrationScript::from_file(path)?);
        }
    }

    set.scripts.sort_by(|a, b| a.path.cmp(&b.path));
    reject_duplicate_edges(&set.scripts)?;
    log::debug!(
        "Discovered {} migration script(s) in {}",
        set.scripts.len(),
        dir.display()
    );
    Ok(set)
}

fn reject_duplicate_edges(scripts: &[MigrationScript]) -> MigrateResult<()> {
    let mut seen: HashMap<(Version, Version), &Path> = HashMap::new();
    for script in scripts {
        let edge = (script.from_version, script.to_version);
        if let Some(first) = seen.insert(edge, script.path.as_path()) {
            return Err(invalid(
                &script.path,
                &format!(
                    "migration {} -> {} is already defined by '{}'",
                    edge.0,
                    edge.1,
                    first.display()
                ),
            ));
        }
    }
    Ok(())
}

fn read(path: &Path) -> MigrateResult<String> {
    std::fs::read_to_string(path).map_err(|e| MigrateError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

fn invalid(path: &Path, reason: &str) -> MigrateError {
    MigrateError::InvalidScript {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
