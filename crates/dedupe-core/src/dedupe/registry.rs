//! Accepted copies per dependency name, and the duplicate classifier.

use super::range::{parse_version, NpmRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One accepted installed copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Installed version (empty when the copy's package.json has none).
    pub version: String,
    /// Absolute path of the installed copy.
    pub path: PathBuf,
}

impl RegistryEntry {
    #[must_use]
    pub fn new(version: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            version: version.into(),
            path: path.into(),
        }
    }
}

/// How an already-accepted copy is judged to cover a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompatibilityMode {
    /// The accepted version must satisfy the range declared by the package
    /// that requires the new copy.
    #[default]
    DeclaredRange,
    /// Any accepted copy covers every later copy of the same name.
    FirstWins,
}

impl CompatibilityMode {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeclaredRange => "declared-range",
            Self::FirstWins => "first-wins",
        }
    }
}

/// A newly encountered installed copy.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub path: &'a Path,
    pub version: &'a str,
    /// Range declared by the package whose dependency this copy satisfies.
    pub declared_range: &'a str,
}

/// Outcome of classifying a candidate against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No accepted copy covers it: keep it and walk its dependencies.
    AcceptedNew,
    /// An earlier accepted copy covers it: remove it.
    Duplicate { retained: PathBuf },
    /// The candidate is the accepted copy itself.
    SelfMatch,
}

/// Classify `candidate` against the entries already accepted for its name.
///
/// The earliest accepted compatible entry wins. Under
/// [`CompatibilityMode::DeclaredRange`], a declared range that is not a
/// semver range (`latest`, `file:`, git URLs) falls back to exact version
/// equality, and an entry with an unparseable version covers nothing.
#[must_use]
pub fn classify(
    entries: &[RegistryEntry],
    candidate: &Candidate<'_>,
    mode: CompatibilityMode,
) -> Classification {
    if entries.iter().any(|e| e.path == candidate.path) {
        return Classification::SelfMatch;
    }

    entries
        .iter()
        .find(|entry| is_compatible(entry, candidate, mode))
        .map_or(Classification::AcceptedNew, |entry| {
            Classification::Duplicate {
                retained: entry.path.clone(),
            }
        })
}

fn is_compatible(entry: &RegistryEntry, candidate: &Candidate<'_>, mode: CompatibilityMode) -> bool {
    match mode {
        CompatibilityMode::FirstWins => true,
        CompatibilityMode::DeclaredRange => match NpmRange::parse(candidate.declared_range) {
            Some(range) => parse_version(&entry.version).is_some_and(|v| range.matches(&v)),
            None => !entry.version.is_empty() && entry.version == candidate.version,
        },
    }
}

/// Accepted copies, keyed by dependency name, in acceptance order.
///
/// Append-only: entries are never updated or removed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct DependencyRegistry {
    entries: BTreeMap<String, Vec<RegistryEntry>>,
}

impl DependencyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries accepted so far for `name`.
    #[must_use]
    pub fn entries_for(&self, name: &str) -> &[RegistryEntry] {
        self.entries.get(name).map_or(&[][..], Vec::as_slice)
    }

    /// Record an accepted copy.
    ///
    /// Returns `false` (and records nothing) if `name` already has an entry
    /// at the same path.
    pub fn accept(&mut self, name: &str, entry: RegistryEntry) -> bool {
        let list = self.entries.entry(name.to_string()).or_default();
        if list.iter().any(|e| e.path == entry.path) {
            return false;
        }
        list.push(entry);
        true
    }

    /// Number of distinct dependency names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total accepted copies across all names.
    #[must_use]
    pub fn copy_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
