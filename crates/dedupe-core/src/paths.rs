use std::path::{Path, PathBuf};

/// Directory that holds installed copies below a package.
pub const NODE_MODULES: &str = "node_modules";

/// Resolve the project directory for a run.
///
/// `path` defaults to `cwd`. A relative `path` is joined onto `cwd`, so the
/// result is absolute whenever `cwd` is.
#[must_use]
pub fn project_dir(cwd: &Path, path: Option<&Path>) -> PathBuf {
    match path {
        None => cwd.to_path_buf(),
        Some(p) if p.is_absolute() => p.to_path_buf(),
        Some(p) => cwd.join(p),
    }
}

/// Where the copy of `dep_name` declared by the package in `dir` is installed.
///
/// Scoped names are split into nested segments:
/// `installed_path("/p", "@types/node")` is `/p/node_modules/@types/node`.
///
/// Returns `None` for a name that is not a single package directory
/// (`..`, `a/b`, `/abs`, ...), so a manifest cannot point outside
/// `node_modules`.
#[must_use]
pub fn installed_path(dir: &Path, dep_name: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = dep_name.split('/').collect();
    let valid = match segments.as_slice() {
        [name] => is_name_segment(name),
        [scope, name] => scope
            .strip_prefix('@')
            .is_some_and(|scope| is_name_segment(scope) && is_name_segment(name)),
        _ => false,
    };
    if !valid {
        return None;
    }

    let mut path = dir.join(NODE_MODULES);
    path.extend(segments);
    Some(path)
}

fn is_name_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['\\', ':', '\0'])
}
