//! Shared test utilities for hop-core
//!
//! An in-memory database whose transactions work on a copy of the committed
//! state, so rollback behaves like a real backend.

use crate::error::{MigrateError, MigrateResult};
use crate::migration::{Migration, Version};
use crate::record::{MigrationRecord, MigrationRecordStore, NewMigrationRecord, Transactional};
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryState {
    pub(crate) table_ready: bool,
    pub(crate) records: Vec<MigrationRecord>,
    /// Statements executed by actions, in order
    pub(crate) statements: Vec<String>,
    next_id: i64,
}

/// Transaction handle over a private copy of the committed state
pub(crate) struct MemoryContext {
    state: RefCell<MemoryState>,
}

impl MemoryContext {
    pub(crate) fn exec(&self, statement: &str) {
        self.state
            .borrow_mut()
            .statements
            .push(statement.to_string());
    }
}

#[derive(Default)]
pub(crate) struct MemoryDb {
    committed: RefCell<MemoryState>,
    pub(crate) commits: Cell<usize>,
    pub(crate) rollbacks: Cell<usize>,
}

impl MemoryDb {
    /// Snapshot of the committed state
    pub(crate) fn state(&self) -> MemoryState {
        self.committed.borrow().clone()
    }

    pub(crate) fn versions(&self) -> Vec<Version> {
        self.committed
            .borrow()
            .records
            .iter()
            .map(|r| r.version)
            .collect()
    }
}

impl Transactional for MemoryDb {
    type Context = MemoryContext;

    fn transaction<T, F>(&self, body: F) -> MigrateResult<T>
    where
        F: FnOnce(&MemoryContext) -> MigrateResult<T>,
    {
        let ctx = MemoryContext {
            state: RefCell::new(self.committed.borrow().clone()),
        };
        let result = body(&ctx);
        if result.is_ok() {
            *self.committed.borrow_mut() = ctx.state.into_inner();
            self.commits.set(self.commits.get() + 1);
        } else {
            self.rollbacks.set(self.rollbacks.get() + 1);
        }
        result
    }
}

pub(crate) struct MemoryStore;

fn require_table(state: &MemoryState) -> MigrateResult<()> {
    if state.table_ready {
        Ok(())
    } else {
        Err(MigrateError::Store("record table does not exist".to_string()))
    }
}

impl MigrationRecordStore for MemoryStore {
    type Context = MemoryContext;

    fn ensure_table(&self, ctx: &MemoryContext) -> MigrateResult<()> {
        ctx.state.borrow_mut().table_ready = true;
        Ok(())
    }

    fn latest_successful_version(&self, ctx: &MemoryContext) -> MigrateResult<Option<Version>> {
        let state = ctx.state.borrow();
        require_table(&state)?;
        Ok(state
            .records
            .iter()
            .rev()
            .find(|r| r.successful)
            .map(|r| r.version))
    }

    fn insert_record(&self, ctx: &MemoryContext, record: &NewMigrationRecord) -> MigrateResult<()> {
        let mut state = ctx.state.borrow_mut();
        require_table(&state)?;
        state.next_id += 1;
        let id = state.next_id;
        state.records.push(MigrationRecord {
            id,
            version: record.version,
            label: record.label.clone(),
            applied_at: record.applied_at,
            execution_time_ms: record.execution_time_ms,
            successful: record.successful,
        });
        Ok(())
    }

    fn records(&self, ctx: &MemoryContext) -> MigrateResult<Vec<MigrationRecord>> {
        let state = ctx.state.borrow();
        require_table(&state)?;
        Ok(state.records.clone())
    }
}

/// Migration that logs `"{from}->{to}"` as its only statement
pub(crate) fn step(from: Version, to: Version) -> Migration<MemoryContext> {
    Migration::new(from, to, move |ctx: &MemoryContext| {
        ctx.exec(&format!("{from}->{to}"));
        Ok(())
    })
}

/// Migration that executes a statement and then fails
pub(crate) fn failing_step(from: Version, to: Version) -> Migration<MemoryContext> {
    Migration::new(from, to, move |ctx: &MemoryContext| {
        ctx.exec(&format!("{from}->{to} (partial)"));
        Err(format!("step {from}->{to} failed").into())
    })
}

/// Migration that does nothing, for graph-only tests
pub(crate) fn noop(from: Version, to: Version) -> Migration<()> {
    Migration::new(from, to, |_| Ok(()))
}
