//! DuckDB-backed migration history.
//!
//! One row per applied bootstrap or migration step. Rows are only ever
//! inserted; the latest successful version is the one on the row with the
//! highest `id`.
//! A version may appear on several rows once a database has been downgraded
//! and upgraded again, so `version` carries no unique constraint.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use duckdb::Connection;
use hop_core::config::is_valid_table_name;
use hop_core::{
    MigrateError, MigrateResult, MigrationRecord, MigrationRecordStore, NewMigrationRecord,
    Version, MAX_LABEL_LEN,
};

/// Default name of the history table
pub const DEFAULT_RECORD_TABLE: &str = "migrations";

/// Migration history stored in a DuckDB table.
#[derive(Debug, Clone)]
pub struct DuckDbRecordStore {
    table: String,
}

impl Default for DuckDbRecordStore {
    fn default() -> Self {
        Self {
            table: DEFAULT_RECORD_TABLE.to_string(),
        }
    }
}

/// Raw column values of one history row
type RecordRow = (i64, Version, String, i64, i64, bool);

impl DuckDbRecordStore {
    /// History stored in `table` (`name` or `schema.name`)
    pub fn new(table: impl Into<String>) -> DbResult<Self> {
        let table = table.into();
        if !is_valid_table_name(&table) {
            return Err(DbError::InvalidTableName(table));
        }
        Ok(Self { table })
    }

    /// Fully qualified table name
    pub fn table(&self) -> &str {
        &self.table
    }

    fn schema(&self) -> Option<&str> {
        self.table.split_once('.').map(|(schema, _)| schema)
    }

    fn create_sql(&self) -> String {
        let table = &self.table;
        let schema = self
            .schema()
            .map(|s| format!("CREATE SCHEMA IF NOT EXISTS {s};\n"))
            .unwrap_or_default();
        format!(
            "{schema}CREATE SEQUENCE IF NOT EXISTS {table}_id_seq START 1;
             CREATE TABLE IF NOT EXISTS {table} (
                 id             BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),
                 version        INTEGER NOT NULL,
                 label          VARCHAR({MAX_LABEL_LEN}) NOT NULL,
                 applied_at     BIGINT NOT NULL,
                 execution_time BIGINT NOT NULL,
                 successful     BOOLEAN NOT NULL
             );"
        )
    }
}

fn into_record(row: RecordRow) -> MigrateResult<MigrationRecord> {
    let (id, version, label, applied_at_ms, execution_time, successful) = row;
    let applied_at = DateTime::<Utc>::from_timestamp_millis(applied_at_ms).ok_or_else(|| {
        MigrateError::Store(format!(
            "record {id} has out-of-range applied_at {applied_at_ms}"
        ))
    })?;
    Ok(MigrationRecord {
        id,
        version,
        label,
        applied_at,
        execution_time_ms: u64::try_from(execution_time).unwrap_or(0),
        successful,
    })
}

impl MigrationRecordStore for DuckDbRecordStore {
    type Context = Connection;

    fn ensure_table(&self, conn: &Connection) -> MigrateResult<()> {
        conn.execute_batch(&self.create_sql()).map_err(|e| {
            MigrateError::Store(format!("failed to create {} table: {e}", self.table))
        })
    }

    fn latest_successful_version(&self, conn: &Connection) -> MigrateResult<Option<Version>> {
        let sql = format!(
            "SELECT version FROM {} WHERE successful ORDER BY id DESC LIMIT 1",
            self.table
        );
        match conn.query_row(&sql, [], |row| row.get::<_, Version>(0)) {
            Ok(version) => Ok(Some(version)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(MigrateError::Store(format!(
                "failed to read latest version: {e}"
            ))),
        }
    }

    fn insert_record(&self, conn: &Connection, record: &NewMigrationRecord) -> MigrateResult<()> {
        if record.label.chars().count() > MAX_LABEL_LEN {
            return Err(MigrateError::Store(format!(
                "label '{}' is longer than {MAX_LABEL_LEN} characters",
                record.label
            )));
        }

        let execution_time = i64::try_from(record.execution_time_ms).unwrap_or(i64::MAX);
        conn.execute(
            &format!(
                "INSERT INTO {} (version, label, applied_at, execution_time, successful)
                 VALUES (?, ?, ?, ?, ?)",
                self.table
            ),
            duckdb::params![
                record.version,
                record.label,
                record.applied_at.timestamp_millis(),
                execution_time,
                record.successful
            ],
        )
        .map_err(|e| {
            MigrateError::Store(format!(
                "failed to record version {} ({}): {e}",
                record.version, record.label
            ))
        })?;
        Ok(())
    }

    fn records(&self, conn: &Connection) -> MigrateResult<Vec<MigrationRecord>> {
        let sql = format!(
            "SELECT id, version, label, applied_at, execution_time, successful
             FROM {} ORDER BY id",
            self.table
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| MigrateError::Store(format!("failed to prepare history query: {e}")))?;

        let rows: Vec<RecordRow> = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .map_err(|e| MigrateError::Store(format!("failed to read history: {e}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| MigrateError::Store(format!("history row error: {e}")))?;

        rows.into_iter().map(into_record).collect()
    }
}

#[cfg(test)]
#[path = "record_store_test.rs"]
mod tests;
