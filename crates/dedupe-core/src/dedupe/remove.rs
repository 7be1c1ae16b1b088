//! Deletion of planned copies.

use super::plan::DeletionPlan;
use super::tree::InstallTree;
use crate::error::codes;
use rayon::prelude::*;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// A planned copy that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of applying a deletion plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    /// Paths that no longer exist, in plan order.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
    /// Bytes on disk below the removed paths, measured before deletion.
    pub freed_bytes: u64,
}

enum Outcome {
    Removed { path: PathBuf, bytes: u64 },
    Failed(RemovalFailure),
}

/// Delete every planned copy.
///
/// Removals run in parallel. A failure is recorded and logged, and does not
/// stop the others. A path that is already gone counts as removed.
pub fn remove_planned<T: InstallTree + ?Sized>(tree: &T, plan: &DeletionPlan) -> RemovalReport {
    let outcomes: Vec<Outcome> = plan
        .doomed()
        .par_iter()
        .map(|copy| remove_one(tree, &copy.path))
        .collect();

    collect(outcomes)
}

/// Measure what [`remove_planned`] would free, without touching the tree.
pub fn measure_planned<T: InstallTree + ?Sized>(tree: &T, plan: &DeletionPlan) -> u64 {
    plan.doomed()
        .par_iter()
        .map(|copy| tree.size_of(&copy.path))
        .sum()
}

fn remove_one<T: InstallTree + ?Sized>(tree: &T, path: &Path) -> Outcome {
    let bytes = tree.size_of(path);
    tracing::info!("Removing duplicate dependency {}", path.display());

    match tree.remove(path) {
        Ok(()) => Outcome::Removed {
            path: path.to_path_buf(),
            bytes,
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("{} was already removed", path.display());
            Outcome::Removed {
                path: path.to_path_buf(),
                bytes: 0,
            }
        }
        Err(e) => {
            tracing::warn!("Failed to remove {}: {e}", path.display());
            Outcome::Failed(RemovalFailure {
                path: path.to_path_buf(),
                code: codes::DEDUPE_REMOVE_FAILED,
                message: e.to_string(),
            })
        }
    }
}

fn collect(outcomes: Vec<Outcome>) -> RemovalReport {
    let mut report = RemovalReport::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Removed { path, bytes } => {
                report.removed.push(path);
                report.freed_bytes += bytes;
            }
            Outcome::Failed(failure) => report.failures.push(failure),
        }
    }
    report
}
