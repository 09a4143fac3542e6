//! History command implementation

use anyhow::{Context, Result};
use hop_core::{MigrationRecord, MigrationRecordStore, Transactional};

use crate::cli::{GlobalArgs, HistoryArgs};
use crate::commands::common::ProjectContext;

/// Execute the history command
pub(crate) fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::open(global)?;
    ctx.ensure_history()?;
    let records = ctx
        .db
        .transaction(|conn| ctx.store.records(conn))
        .context("Failed to read migration history")?;

    if args.json {
        let json =
            serde_json::to_string_pretty(&records).context("Failed to serialize history")?;
        println!("{json}");
    } else if records.is_empty() {
        println!("No migrations recorded");
    } else {
        print_table(&records);
    }
    Ok(())
}

/// Print records in table format
fn print_table(records: &[MigrationRecord]) {
    let label_width = records
        .iter()
        .map(|r| r.label.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "{:>7}  {:<label_width$}  {:<19}  {:>9}  STATUS",
        "VERSION", "LABEL", "APPLIED_AT", "TIME_MS"
    );
    println!(
        "{:->7}  {:-<label_width$}  {:-<19}  {:->9}  {}",
        "", "", "", "", "-".repeat(6)
    );

    for record in records {
        let status = if record.successful { "ok" } else { "failed" };
        println!(
            "{:>7}  {:<label_width$}  {:<19}  {:>9}  {}",
            record.version,
            record.label,
            record.applied_at.format("%Y-%m-%d %H:%M:%S"),
            record.execution_time_ms,
            status
        );
    }
}
