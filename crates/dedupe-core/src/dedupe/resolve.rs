//! Recursive traversal of the installed tree.
//!
//! Sibling dependencies are visited in parallel on the rayon pool. The
//! registry and the deletion plan sit behind a single mutex so that
//! classify-then-append is atomic; a branch only recurses after its own
//! decision has been committed and the lock released.

use super::manifest::Manifest;
use super::plan::{DeletionPlan, DoomedCopy};
use super::registry::{
    classify, Candidate, Classification, CompatibilityMode, DependencyRegistry, RegistryEntry,
};
use super::tree::InstallTree;
use crate::error::Error;
use crate::paths;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Options for a traversal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    /// Fold `devDependencies` into every visited manifest.
    pub include_dev_dependencies: bool,
    pub compatibility: CompatibilityMode,
}

/// Shared state for one run.
#[derive(Debug, Default)]
pub struct ResolveState {
    inner: Mutex<StateInner>,
}

#[derive(Debug, Default)]
struct StateInner {
    registry: DependencyRegistry,
    plan: DeletionPlan,
}

impl ResolveState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the state after the traversal has finished.
    #[must_use]
    pub fn into_parts(self) -> (DependencyRegistry, DeletionPlan) {
        let inner = self
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        (inner.registry, inner.plan)
    }

    /// Classify a copy and record the outcome, atomically.
    fn classify_and_record(
        &self,
        name: &str,
        candidate: &Candidate<'_>,
        mode: CompatibilityMode,
    ) -> Classification {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let classification = classify(inner.registry.entries_for(name), candidate, mode);

        match &classification {
            Classification::AcceptedNew => {
                inner.registry.accept(
                    name,
                    RegistryEntry::new(candidate.version, candidate.path),
                );
            }
            Classification::Duplicate { retained } => {
                inner.plan.push(DoomedCopy {
                    name: name.to_string(),
                    version: candidate.version.to_string(),
                    path: candidate.path.to_path_buf(),
                    retained: retained.clone(),
                });
            }
            Classification::SelfMatch => {}
        }

        classification
    }
}

/// Walk the dependencies of `manifest`, loaded from `directory`.
///
/// Returns once every branch below `directory` has finished. The first
/// fatal error stops the walk and is returned; nothing is deleted here.
pub fn resolve<T: InstallTree + ?Sized>(
    tree: &T,
    manifest: &Manifest,
    directory: &Path,
    state: &ResolveState,
    options: &ResolveOptions,
) -> Result<(), Error> {
    let ancestors = vec![tree.canonical_path(directory)];
    visit(tree, manifest, directory, &ancestors, state, options)
}

fn visit<T: InstallTree + ?Sized>(
    tree: &T,
    manifest: &Manifest,
    directory: &Path,
    ancestors: &[PathBuf],
    state: &ResolveState,
    options: &ResolveOptions,
) -> Result<(), Error> {
    let effective = manifest.effective_dependencies(options.include_dev_dependencies);

    for collision in &effective.collisions {
        if collision.differs() {
            tracing::warn!(
                "Dependency {} was found in dependencies ({}) and devDependencies ({}) of project '{}'. Using {}.",
                collision.name,
                collision.dependency_range,
                collision.dev_range,
                manifest.display_name(),
                collision.dependency_range,
            );
        } else {
            tracing::debug!(
                "Dependency {} is declared in both dependencies and devDependencies of project '{}'",
                collision.name,
                manifest.display_name(),
            );
        }
    }

    effective.deps.par_iter().try_for_each(|(dep_name, range)| {
        visit_dependency(
            tree, manifest, directory, dep_name, range, ancestors, state, options,
        )
    })
}

#[allow(clippy::too_many_arguments)]
fn visit_dependency<T: InstallTree + ?Sized>(
    tree: &T,
    parent: &Manifest,
    directory: &Path,
    dep_name: &str,
    declared_range: &str,
    ancestors: &[PathBuf],
    state: &ResolveState,
    options: &ResolveOptions,
) -> Result<(), Error> {
    let Some(installed) = paths::installed_path(directory, dep_name) else {
        tracing::warn!(
            "Project '{}' declares invalid dependency name '{}', skipping it",
            parent.display_name(),
            dep_name
        );
        return Ok(());
    };

    if !tree.is_installed(&installed) {
        tracing::trace!(
            "Project '{}' dependency {} not found on disk",
            parent.display_name(),
            dep_name
        );
        return Ok(());
    }

    let manifest = tree
        .load_manifest(&installed)
        .map_err(|e| Error::inconsistent_install(&installed, e.to_string()))?
        .ok_or_else(|| Error::inconsistent_install(&installed, "package.json is missing"))?;

    let canonical = tree.canonical_path(&installed);
    if ancestors.contains(&canonical) {
        tracing::warn!(
            "Dependency cycle: {} links back to {}, not following it",
            installed.display(),
            canonical.display()
        );
        return Ok(());
    }

    let version = manifest.version.clone().unwrap_or_default();
    let candidate = Candidate {
        path: &installed,
        version: &version,
        declared_range,
    };

    match state.classify_and_record(dep_name, &candidate, options.compatibility) {
        Classification::AcceptedNew => {
            tracing::trace!(
                "Found new dependency '{}' version '{}' path: {}",
                dep_name,
                version,
                installed.display()
            );
            let mut chain = ancestors.to_vec();
            chain.push(canonical);
            visit(tree, &manifest, &installed, &chain, state, options)
        }
        Classification::Duplicate { retained } => {
            tracing::trace!(
                "Will remove duplicate dependency '{}' version '{}' path: {} (using {})",
                dep_name,
                version,
                installed.display(),
                retained.display()
            );
            Ok(())
        }
        Classification::SelfMatch => {
            tracing::trace!(
                "Project '{}' dependency {} using {}",
                parent.display_name(),
                dep_name,
                installed.display()
            );
            Ok(())
        }
    }
}
