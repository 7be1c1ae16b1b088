use super::plan::DoomedCopy;
use super::registry::{CompatibilityMode, DependencyRegistry};
use super::remove::RemovalFailure;
use serde::Serialize;
use std::path::PathBuf;

/// Bumped on any breaking change to the serialized report.
pub const DEDUPE_SCHEMA_VERSION: u32 = 1;

/// Summary of one dedupe run.
#[derive(Debug, Clone, Serialize)]
pub struct DedupeReport {
    pub schema_version: u32,
    /// Project directory that was walked.
    pub root: String,
    pub dry_run: bool,
    pub compatibility: CompatibilityMode,
    /// Copies that were kept, by dependency name.
    pub accepted: DependencyRegistry,
    /// Copies judged redundant, in discovery order.
    pub doomed: Vec<DoomedCopy>,
    /// Paths actually deleted. Always empty on a dry run.
    pub removed: Vec<PathBuf>,
    pub failures: Vec<RemovalFailure>,
    /// Bytes freed, or that would be freed on a dry run.
    pub freed_bytes: u64,
}

impl DedupeReport {
    /// Whether every planned copy is gone (or would be, on a dry run).
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
