//! Greedy migration path resolution.

use crate::error::{MigrateError, MigrateResult};
use crate::graph::MigrationGraph;
use crate::migration::{Migration, Version};
use std::collections::BTreeMap;

/// Which way a path moves through versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upgrade,
    Downgrade,
}

impl Direction {
    /// Direction from `start` to `end`, or `None` when they are equal
    pub fn between(start: Version, end: Version) -> Option<Self> {
        match end.cmp(&start) {
            std::cmp::Ordering::Greater => Some(Direction::Upgrade),
            std::cmp::Ordering::Less => Some(Direction::Downgrade),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Resolve the ordered list of migrations leading from `start` to `end`.
///
/// From each version the furthest jump toward `end` that does not overshoot
/// it is taken: the largest target in `(current, end]` when upgrading, the
/// smallest in `[end, current)` when downgrading. There is no backtracking;
/// if any version has no usable edge the whole resolution fails with
/// [`MigrateError::MissingPath`].
///
/// Returns an empty path when `start == end`.
pub fn resolve_path<'a, C>(
    graph: &MigrationGraph<'a, C>,
    start: Version,
    end: Version,
) -> MigrateResult<Vec<&'a Migration<C>>> {
    let Some(direction) = Direction::between(start, end) else {
        return Ok(Vec::new());
    };

    let mut current = start;
    let mut path = Vec::new();

    while current != end {
        let step = graph
            .targets_from(current)
            .and_then(|targets| next_step(targets, current, end, direction));

        let Some(migration) = step else {
            return Err(MigrateError::MissingPath {
                from: start,
                to: end,
                stalled_at: current,
            });
        };

        path.push(migration);
        current = migration.to_version();
    }

    Ok(path)
}

fn next_step<'a, C>(
    targets: &BTreeMap<Version, &'a Migration<C>>,
    current: Version,
    end: Version,
    direction: Direction,
) -> Option<&'a Migration<C>> {
    // current < end when upgrading and current > end when downgrading, so
    // both ranges are well-formed.
    let candidate = match direction {
        Direction::Upgrade => targets.range(current + 1..=end).next_back(),
        Direction::Downgrade => targets.range(end..current).next(),
    };
    candidate.map(|(_, migration)| *migration)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
