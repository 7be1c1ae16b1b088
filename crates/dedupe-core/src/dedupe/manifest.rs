//! package.json loading.
//!
//! Only the fields the traversal consumes are kept: `name`, `version`,
//! `dependencies` and `devDependencies`.

use crate::error::Error;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a package.json that drive deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Production dependencies, name -> declared range.
    pub dependencies: BTreeMap<String, String>,
    /// Dev dependencies, name -> declared range.
    pub dev_dependencies: BTreeMap<String, String>,
}

/// A name declared in both `dependencies` and `devDependencies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    /// The range that was kept.
    pub dependency_range: String,
    /// The range that was dropped.
    pub dev_range: String,
}

impl NameCollision {
    /// Whether the two declarations disagree.
    #[must_use]
    pub fn differs(&self) -> bool {
        self.dependency_range != self.dev_range
    }
}

/// The dependency set a visit walks, after folding in dev dependencies.
#[derive(Debug, Clone, Default)]
pub struct EffectiveDependencies {
    pub deps: BTreeMap<String, String>,
    pub collisions: Vec<NameCollision>,
}

impl Manifest {
    /// Parse manifest JSON. `path` is only used for error messages.
    ///
    /// Dependency entries whose range is not a string are skipped with a
    /// warning, as is a dependency section that is not an object.
    pub fn parse(content: &str, path: &Path) -> Result<Self, Error> {
        let json: Value = serde_json::from_str(content)
            .map_err(|e| Error::manifest_invalid(path, format!("Invalid JSON: {e}")))?;

        let root = json
            .as_object()
            .ok_or_else(|| Error::manifest_invalid(path, "package.json must be a JSON object"))?;

        Ok(Self {
            name: string_field(root, "name"),
            version: string_field(root, "version"),
            dependencies: extract_section(root, "dependencies", path),
            dev_dependencies: extract_section(root, "devDependencies", path),
        })
    }

    /// Name for diagnostics.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Merge `devDependencies` into `dependencies` when `include_dev` is set.
    ///
    /// On a name present in both, the production range wins and the pair is
    /// reported as a collision.
    #[must_use]
    pub fn effective_dependencies(&self, include_dev: bool) -> EffectiveDependencies {
        let mut deps = self.dependencies.clone();
        let mut collisions = Vec::new();

        if include_dev {
            for (name, dev_range) in &self.dev_dependencies {
                match deps.get(name) {
                    Some(range) => collisions.push(NameCollision {
                        name: name.clone(),
                        dependency_range: range.clone(),
                        dev_range: dev_range.clone(),
                    }),
                    None => {
                        deps.insert(name.clone(), dev_range.clone());
                    }
                }
            }
        }

        EffectiveDependencies { deps, collisions }
    }
}

fn string_field(root: &Map<String, Value>, key: &str) -> Option<String> {
    root.get(key).and_then(Value::as_str).map(String::from)
}

fn extract_section(root: &Map<String, Value>, section: &str, path: &Path) -> BTreeMap<String, String> {
    let mut deps = BTreeMap::new();

    let Some(section_value) = root.get(section) else {
        return deps;
    };

    let Some(section_obj) = section_value.as_object() else {
        tracing::warn!(
            path = %path.display(),
            "'{section}' must be an object, got {}",
            json_type_name(section_value)
        );
        return deps;
    };

    for (name, range_value) in section_obj {
        if let Some(range) = range_value.as_str() {
            deps.insert(name.clone(), range.to_string());
        } else {
            tracing::warn!(
                path = %path.display(),
                "Invalid range for '{name}' in {section}: expected string, got {}",
                json_type_name(range_value)
            );
        }
    }

    deps
}

/// Get a human-readable type name for a JSON value.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
