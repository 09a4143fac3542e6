//! Plan command implementation

use anyhow::{Context, Result};
use hop_db::migrator_from_dir;

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::common::ProjectContext;

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::open(global)?;
    let target = ctx.target_version(args.target)?;

    let dir = ctx.migrations_dir();
    let migrator = migrator_from_dir(&dir, target)
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;

    let Some(current) = ctx.current_version()? else {
        println!("No migration history: bootstrap would record version {target}");
        return Ok(());
    };

    let path = migrator
        .plan(current)
        .with_context(|| format!("Cannot plan from version {current} to {target}"))?;

    if path.is_empty() {
        println!("Already at version {current}, nothing to do");
        return Ok(());
    }

    println!("Plan from version {current} to {target}:");
    for migration in &path {
        println!("  {migration}");
    }
    println!("{} migration(s) would run", path.len());
    Ok(())
}
