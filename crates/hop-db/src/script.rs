//! Turn discovered SQL scripts into runnable DuckDB migrations.

use duckdb::Connection;
use hop_core::script::discover_scripts;
use hop_core::{ActionResult, MigrateResult, Migration, MigrationScript, Migrator, ScriptSet, Version};
use std::path::Path;

/// A migration that runs the script's SQL as one batch
pub fn script_migration(script: MigrationScript) -> Migration<Connection> {
    let MigrationScript {
        from_version,
        to_version,
        label,
        sql,
        ..
    } = script;

    Migration::new(from_version, to_version, move |conn: &Connection| {
        conn.execute_batch(&sql)?;
        Ok(())
    })
    .named(label)
}

/// Bootstrap action running `sql`, or doing nothing when there is none
pub fn script_bootstrap(
    sql: Option<String>,
) -> impl Fn(&Connection) -> ActionResult + Send + Sync + 'static {
    move |conn: &Connection| {
        if let Some(sql) = &sql {
            conn.execute_batch(sql)?;
        }
        Ok(())
    }
}

/// Build a migrator for `target_version` from a discovered script set
pub fn script_migrator(set: ScriptSet, target_version: Version) -> MigrateResult<Migrator<Connection>> {
    let migrations = set.scripts.into_iter().map(script_migration).collect();
    Migrator::new(target_version, script_bootstrap(set.bootstrap), migrations)
}

/// Discover the scripts in `dir` and build a migrator for `target_version`
pub fn migrator_from_dir(dir: &Path, target_version: Version) -> MigrateResult<Migrator<Connection>> {
    script_migrator(discover_scripts(dir)?, target_version)
}
