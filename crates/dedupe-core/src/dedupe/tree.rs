//! Filesystem seam for the traversal and the remover.

use super::manifest::{Manifest, MANIFEST_FILE};
use crate::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Access to an installed package tree.
///
/// Implementations must be thread-safe: the resolver and the remover call
/// into them from rayon worker threads.
pub trait InstallTree: Send + Sync + fmt::Debug {
    /// Load the manifest in `dir`.
    ///
    /// Returns `Ok(None)` when `dir` has no package.json.
    fn load_manifest(&self, dir: &Path) -> Result<Option<Manifest>, Error>;

    /// Whether an installed copy exists at `path`.
    fn is_installed(&self, path: &Path) -> bool;

    /// Canonical form of `path`, used to detect linked cycles.
    fn canonical_path(&self, path: &Path) -> PathBuf;

    /// Bytes on disk below `path`.
    fn size_of(&self, path: &Path) -> u64;

    /// Recursively delete `path`. A symlinked copy loses only the link.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsInstallTree;

impl InstallTree for FsInstallTree {
    fn load_manifest(&self, dir: &Path) -> Result<Option<Manifest>, Error> {
        let path = dir.join(MANIFEST_FILE);
        match dedupe_util::fs::read_to_string_lossy(&path) {
            Ok(content) => Manifest::parse(&content, &path).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::ManifestRead { path, source }),
        }
    }

    fn is_installed(&self, path: &Path) -> bool {
        dedupe_util::fs::is_dir(path)
    }

    fn canonical_path(&self, path: &Path) -> PathBuf {
        dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }

    fn size_of(&self, path: &Path) -> u64 {
        dedupe_util::fs::dir_size(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }
}
