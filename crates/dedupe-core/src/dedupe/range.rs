//! npm version range matching on top of `semver`.
//!
//! `semver::VersionReq` follows Cargo's rules, which differ from npm's in a
//! few places. Ranges are rewritten before parsing:
//! - Bare versions are exact: `1.2.3` becomes `=1.2.3` (Cargo reads it as `^1.2.3`)
//! - Hyphen ranges: `1.0.0 - 2.0.0` becomes `>=1.0.0, <=2.0.0`
//! - X-ranges: `1.x`, `1.2.*`, `^2.x` drop the wildcard parts
//! - Space-separated comparators: `>= 2.1.2 < 3.0.0` becomes `>=2.1.2, <3.0.0`
//! - OR ranges: `^1.0.0 || ^2.0.0` match if any alternative matches
//! - `*`, `x` and the empty range match every release

use semver::{Version, VersionReq};

/// A parsed npm range: a set of alternatives joined by `||`.
#[derive(Debug, Clone)]
pub struct NpmRange {
    alternatives: Vec<VersionReq>,
}

impl NpmRange {
    /// Parse an npm range.
    ///
    /// Returns `None` for specifiers that are not version ranges at all
    /// (`latest`, `file:../pkg`, git URLs, ...) or that fail to parse.
    #[must_use]
    pub fn parse(range: &str) -> Option<Self> {
        let alternatives = range
            .split("||")
            .map(parse_alternative)
            .collect::<Option<Vec<_>>>()?;

        if alternatives.is_empty() {
            return None;
        }

        Some(Self { alternatives })
    }

    /// Whether `version` satisfies any alternative.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }
}

/// Parse an installed version string, tolerating a leading `v` and whitespace.
#[must_use]
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let version = version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('='))
        .unwrap_or(version);
    Version::parse(version).ok()
}

/// Parse one `||` alternative into a `VersionReq`.
fn parse_alternative(range: &str) -> Option<VersionReq> {
    let range = range.trim();

    if range.is_empty() {
        return Some(VersionReq::STAR);
    }

    let comparators = match parse_hyphen_range(range) {
        Some((start, end)) => hyphen_comparators(start, end)?,
        None => split_comparators(range)
            .iter()
            .map(|token| normalize_comparator(token))
            .collect::<Option<Vec<_>>>()?,
    };

    // semver rejects `*` mixed with other comparators; it adds nothing there anyway.
    let bounded: Vec<String> = comparators.into_iter().filter(|c| c != "*").collect();
    if bounded.is_empty() {
        return Some(VersionReq::STAR);
    }

    VersionReq::parse(&bounded.join(", ")).ok()
}

/// Parse a hyphen range like "1.0.0 - 2.0.0".
fn parse_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start, end))
}

fn hyphen_comparators(start: &str, end: &str) -> Option<Vec<String>> {
    let mut comparators = Vec::with_capacity(2);
    match normalize_version(start)? {
        Some(v) => comparators.push(format!(">={v}")),
        None => comparators.push("*".to_string()),
    }
    match normalize_version(end)? {
        Some(v) => comparators.push(format!("<={v}")),
        None => comparators.push("*".to_string()),
    }
    Some(comparators)
}

/// Split a range on whitespace, re-attaching operators written apart from
/// their version (`>= 1.2.3`).
fn split_comparators(range: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_op = String::new();

    for token in range.split_whitespace() {
        if token.chars().all(is_operator_char) {
            pending_op.push_str(token);
            continue;
        }
        tokens.push(format!("{pending_op}{token}"));
        pending_op.clear();
    }

    if !pending_op.is_empty() {
        tokens.push(pending_op);
    }

    tokens
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '~' | '^')
}

/// Rewrite one npm comparator into `semver` syntax.
fn normalize_comparator(token: &str) -> Option<String> {
    let split = token.find(|c: char| !is_operator_char(c)).unwrap_or(token.len());
    let (op, version) = token.split_at(split);

    let op = match op {
        "" | "=" => "=",
        "^" | "~" | ">" | ">=" | "<" | "<=" => op,
        _ => return None,
    };

    match normalize_version(version)? {
        Some(v) => Some(format!("{op}{v}")),
        // `>x` and `<x` can never match; everything else is unbounded.
        None if matches!(op, ">" | "<") => None,
        None => Some("*".to_string()),
    }
}

/// Normalize the version part of a comparator.
///
/// Returns `Some(None)` for a pure wildcard (`*`, `x`, `X`), `Some(Some(v))`
/// for a (possibly partial) version, and `None` when it is not a version.
fn normalize_version(version: &str) -> Option<Option<String>> {
    let version = version
        .strip_prefix(|c: char| c == 'v' || c == 'V')
        .unwrap_or(version);
    if version.is_empty() {
        return None;
    }

    let (core, suffix) = match version.find(|c: char| c == '-' || c == '+') {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };

    let mut parts = Vec::new();
    let mut wildcard = false;
    for part in core.split('.') {
        if matches!(part, "x" | "X" | "*") {
            wildcard = true;
            break;
        }
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        parts.push(part);
    }

    if parts.len() > 3 {
        return None;
    }
    if parts.is_empty() {
        return Some(None);
    }

    let mut normalized = parts.join(".");
    // Prerelease and build tags only make sense on a full version.
    if !wildcard && parts.len() == 3 {
        normalized.push_str(suffix);
    } else if !suffix.is_empty() && !wildcard {
        return None;
    }

    Some(Some(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_satisfies(version: &str, range: &str) -> Option<bool> {
        let range = NpmRange::parse(range)?;
        let version = parse_version(version)?;
        Some(range.matches(&version))
    }

    fn sat(version: &str, range: &str) -> bool {
        version_satisfies(version, range).unwrap_or_else(|| panic!("{range} should parse"))
    }

    #[test]
    fn test_caret_range() {
        assert!(sat("1.5.0", "^1.0.0"));
        assert!(!sat("2.0.0", "^1.0.0"));
        assert!(sat("0.2.5", "^0.2.0"));
        assert!(!sat("0.3.0", "^0.2.0"));
    }

    #[test]
    fn test_tilde_range() {
        assert!(sat("1.0.5", "~1.0.0"));
        assert!(!sat("1.1.0", "~1.0.0"));
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(sat("1.2.3", "1.2.3"));
        assert!(!sat("1.2.4", "1.2.3"));
        assert!(sat("1.2.3", "=1.2.3"));
        assert!(sat("1.2.3", "v1.2.3"));
    }

    #[test]
    fn test_partial_versions() {
        // npm reads "1" as 1.x and "1.2" as 1.2.x
        assert!(sat("1.9.0", "1"));
        assert!(!sat("2.0.0", "1"));
        assert!(sat("1.2.9", "1.2"));
        assert!(!sat("1.3.0", "1.2"));
    }

    #[test]
    fn test_x_ranges() {
        assert!(sat("1.5.0", "1.x"));
        assert!(!sat("2.0.0", "1.x"));
        assert!(sat("1.2.7", "1.2.x"));
        assert!(!sat("1.3.0", "1.2.*"));
        assert!(sat("3.1.0", "^3.x"));
        assert!(sat("9.9.9", "*"));
        assert!(sat("9.9.9", "x"));
        assert!(sat("9.9.9", ""));
    }

    #[test]
    fn test_hyphen_range() {
        assert!(sat("1.0.0", "1.0.0 - 2.0.0"));
        assert!(sat("2.0.0", "1.0.0 - 2.0.0"));
        assert!(!sat("2.0.1", "1.0.0 - 2.0.0"));
        // Partial upper bound covers the whole minor line
        assert!(sat("2.3.9", "1.0.0 - 2.3"));
        assert!(!sat("2.4.0", "1.0.0 - 2.3"));
    }

    #[test]
    fn test_space_separated_comparators() {
        assert!(sat("2.5.0", ">= 2.1.2 < 3.0.0"));
        assert!(sat("2.1.2", ">=2.1.2 <3.0.0"));
        assert!(!sat("3.0.0", ">= 2.1.2 < 3.0.0"));
        assert!(!sat("2.0.0", ">=2.1.2 <3.0.0"));
    }

    #[test]
    fn test_or_ranges() {
        assert!(sat("1.5.0", "^1.0.0 || ^2.0.0"));
        assert!(sat("2.5.0", "^1.0.0||^2.0.0"));
        assert!(!sat("3.0.0", "^1.0.0 || ^2.0.0"));
    }

    #[test]
    fn test_prerelease_excluded_from_plain_range() {
        assert!(!sat("2.0.0-beta.1", "^1.0.0"));
        assert!(sat("2.0.0-beta.2", ">=2.0.0-beta.1"));
    }

    #[test]
    fn test_non_version_specifiers() {
        assert_eq!(version_satisfies("1.0.0", "latest"), None);
        assert_eq!(version_satisfies("1.0.0", "file:../local"), None);
        assert_eq!(version_satisfies("1.0.0", "github:user/repo"), None);
        assert_eq!(
            version_satisfies("1.0.0", "git+https://example.com/r.git"),
            None
        );
    }

    #[test]
    fn test_unparseable_version() {
        assert_eq!(version_satisfies("", "^1.0.0"), None);
        assert_eq!(version_satisfies("not-a-version", "^1.0.0"), None);
    }

    #[test]
    fn test_parse_version_tolerates_prefix() {
        assert_eq!(parse_version(" v1.2.3 "), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version("1.2"), None);
    }
}
