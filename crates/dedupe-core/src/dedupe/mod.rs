//! node_modules deduplication.
//!
//! A run walks the installed tree from the project's package.json, keeps the
//! first copy of each dependency it meets, plans the later compatible copies
//! for deletion and finally removes them:
//!
//! - [`resolve`] builds the [`DependencyRegistry`] and [`DeletionPlan`]
//! - [`remove_planned`] deletes the plan
//! - [`dedupe`] runs both and returns a [`DedupeReport`]

mod manifest;
mod plan;
mod range;
mod registry;
mod remove;
mod report;
mod resolve;
mod tree;

pub use manifest::{EffectiveDependencies, Manifest, NameCollision, MANIFEST_FILE};
pub use plan::{DeletionPlan, DoomedCopy};
pub use registry::{
    classify, Candidate, Classification, CompatibilityMode, DependencyRegistry, RegistryEntry,
};
pub use remove::{measure_planned, remove_planned, RemovalFailure, RemovalReport};
pub use report::{DedupeReport, DEDUPE_SCHEMA_VERSION};
pub use resolve::{resolve, ResolveOptions, ResolveState};
pub use tree::{FsInstallTree, InstallTree};

use crate::config::Config;
use crate::error::Error;
use crate::paths;
use std::path::PathBuf;

/// Options for one dedupe run.
#[derive(Debug, Clone, Default)]
pub struct DedupeOptions {
    /// Project directory. Defaults to the configured cwd; relative paths
    /// resolve against it.
    pub path: Option<PathBuf>,
    pub include_dev_dependencies: bool,
    /// Plan and measure, but delete nothing.
    pub dry_run: bool,
    pub compatibility: CompatibilityMode,
}

impl DedupeOptions {
    fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            include_dev_dependencies: self.include_dev_dependencies,
            compatibility: self.compatibility,
        }
    }
}

/// Deduplicate the installed tree of one project.
///
/// Nothing is deleted unless the whole traversal succeeds. Deletion
/// failures do not fail the run; they are listed in the report.
pub fn dedupe<T: InstallTree + ?Sized>(
    config: &Config,
    options: &DedupeOptions,
    tree: &T,
) -> Result<DedupeReport, Error> {
    let dir = tree.canonical_path(&paths::project_dir(&config.cwd, options.path.as_deref()));
    tracing::debug!("Deduplicating dependencies of {}", dir.display());

    let manifest = tree
        .load_manifest(&dir)?
        .ok_or_else(|| Error::ManifestNotFound {
            path: dir.join(MANIFEST_FILE),
        })?;

    let state = ResolveState::new();
    resolve(tree, &manifest, &dir, &state, &options.resolve_options())?;
    let (accepted, plan) = state.into_parts();

    tracing::debug!(
        "Accepted {} copies of {} dependencies, {} duplicates planned",
        accepted.copy_count(),
        accepted.len(),
        plan.len()
    );

    let (removed, failures, freed_bytes) = if options.dry_run {
        (Vec::new(), Vec::new(), measure_planned(tree, &plan))
    } else {
        let removal = remove_planned(tree, &plan);
        (removal.removed, removal.failures, removal.freed_bytes)
    };

    Ok(DedupeReport {
        schema_version: DEDUPE_SCHEMA_VERSION,
        root: dir.display().to_string(),
        dry_run: options.dry_run,
        compatibility: options.compatibility,
        accepted,
        doomed: plan.into_doomed(),
        removed,
        failures,
        freed_bytes,
    })
}
