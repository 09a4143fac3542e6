//! Status command implementation

use anyhow::{Context, Result};
use hop_core::Version;
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::ProjectContext;

#[derive(Debug, Serialize)]
struct Status {
    current_version: Option<Version>,
    target_version: Option<Version>,
    record_table: String,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::open(global)?;
    let status = Status {
        current_version: ctx.current_version()?,
        target_version: ctx.config.target_version,
        record_table: ctx.store.table().to_string(),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&status).context("Failed to serialize status")?;
        println!("{json}");
        return Ok(());
    }

    match status.current_version {
        Some(version) => println!("Current version: {version}"),
        None => println!("Current version: none (not bootstrapped)"),
    }
    if let Some(target) = status.target_version {
        println!("Configured target: {target}");
    }
    Ok(())
}
