//! Migrate command implementation

use anyhow::{Context, Result};
use hop_core::MigrationOutcome;
use hop_db::migrator_from_dir;

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::ProjectContext;

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::open(global)?;
    let target = ctx.target_version(args.target)?;

    let dir = ctx.migrations_dir();
    let migrator = migrator_from_dir(&dir, target)
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
    let outcome = migrator
        .apply_migrations(&ctx.db, &ctx.store)
        .with_context(|| format!("Migration to version {target} failed"))?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&outcome).context("Failed to serialize outcome")?;
        println!("{json}");
    } else {
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &MigrationOutcome) {
    if let MigrationOutcome::Migrated { steps, .. } = outcome {
        for step in steps {
            println!(
                "  {} -> {}  {}  ({}ms)",
                step.from_version, step.to_version, step.label, step.execution_time_ms
            );
        }
    }
    println!("{outcome}");
}
