//! The doomed set: installed copies scheduled for removal.

use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// An installed copy judged redundant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoomedCopy {
    /// Dependency name.
    pub name: String,
    /// Installed version of the doomed copy.
    pub version: String,
    /// Path that will be removed.
    pub path: PathBuf,
    /// Accepted copy that covers it.
    pub retained: PathBuf,
}

/// Ordered, append-only collection of doomed copies. A path is planned at most once.
#[derive(Debug, Clone, Default)]
pub struct DeletionPlan {
    doomed: Vec<DoomedCopy>,
    paths: HashSet<PathBuf>,
}

impl DeletionPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan a removal. Returns `false` if the path was already planned.
    pub fn push(&mut self, copy: DoomedCopy) -> bool {
        if !self.paths.insert(copy.path.clone()) {
            return false;
        }
        self.doomed.push(copy);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.doomed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doomed.is_empty()
    }

    /// Planned copies in discovery order.
    #[must_use]
    pub fn doomed(&self) -> &[DoomedCopy] {
        &self.doomed
    }

    #[must_use]
    pub fn into_doomed(self) -> Vec<DoomedCopy> {
        self.doomed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn copy(path: &str) -> DoomedCopy {
        DoomedCopy {
            name: "c".to_string(),
            version: "1.0.0".to_string(),
            path: PathBuf::from(path),
            retained: PathBuf::from("/p/node_modules/c"),
        }
    }

    #[test]
    fn test_push_keeps_order() {
        let mut plan = DeletionPlan::new();
        assert!(plan.push(copy("/p/node_modules/b/node_modules/c")));
        assert!(plan.push(copy("/p/node_modules/a/node_modules/c")));

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.doomed()[0].path,
            PathBuf::from("/p/node_modules/b/node_modules/c")
        );
    }

    #[test]
    fn test_push_rejects_repeated_path() {
        let mut plan = DeletionPlan::new();
        assert!(plan.push(copy("/p/node_modules/b/node_modules/c")));
        assert!(!plan.push(copy("/p/node_modules/b/node_modules/c")));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan.into_doomed().len(), 1);
    }
}
