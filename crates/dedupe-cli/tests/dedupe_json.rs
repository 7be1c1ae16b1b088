//! Integration tests for `dedupe-dependencies`.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn dedupe_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_dedupe-dependencies"))
}

fn run_in(cwd: &Path, args: &[&str]) -> Output {
    dedupe_bin()
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .env_remove("DEDUPE_PATH")
        .args(args)
        .output()
        .expect("Failed to run dedupe-dependencies")
}

fn write_package(dir: &Path, name: &str, version: &str, deps: serde_json::Value) {
    fs::create_dir_all(dir).unwrap();
    let json = serde_json::json!({ "name": name, "version": version, "dependencies": deps });
    fs::write(dir.join("package.json"), json.to_string()).unwrap();
    fs::write(dir.join("index.js"), "module.exports = {};\n").unwrap();
}

/// app -> {a, b}; a and b each carry their own copy of c.
fn nested_project(root: &Path, c_b_version: &str, c_b_range: &str) {
    write_package(
        root,
        "app",
        "1.0.0",
        serde_json::json!({ "a": "^1.0.0", "b": "^1.0.0" }),
    );
    let a = root.join("node_modules/a");
    let b = root.join("node_modules/b");
    write_package(&a, "a", "1.0.0", serde_json::json!({ "c": "^1.0.0" }));
    write_package(&b, "b", "1.0.0", serde_json::json!({ "c": c_b_range }));
    write_package(&a.join("node_modules/c"), "c", "1.2.0", serde_json::json!({}));
    write_package(
        &b.join("node_modules/c"),
        "c",
        c_b_version,
        serde_json::json!({}),
    );
}

fn parse_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("stdout should be valid JSON")
}

#[test]
fn test_removes_nested_duplicate() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "1.2.0", "^1.0.0");

    let output = run_in(dir.path(), &["--json"]);
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["ok"], true);
    assert_eq!(json["dedupe"]["schema_version"], 1);
    assert_eq!(json["dedupe"]["doomed"].as_array().unwrap().len(), 1);
    assert_eq!(json["dedupe"]["removed"].as_array().unwrap().len(), 1);

    let ac = dir.path().join("node_modules/a/node_modules/c");
    let bc = dir.path().join("node_modules/b/node_modules/c");
    assert!(ac.exists() != bc.exists(), "exactly one copy of c survives");
}

#[test]
fn test_keeps_incompatible_copies() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "2.0.0", "^2.0.0");

    let output = run_in(dir.path(), &["--json"]);
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert!(json["dedupe"]["doomed"].as_array().unwrap().is_empty());
    assert!(dir.path().join("node_modules/a/node_modules/c").exists());
    assert!(dir.path().join("node_modules/b/node_modules/c").exists());
}

#[test]
fn test_first_wins_removes_incompatible_copy() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "2.0.0", "^2.0.0");

    let output = run_in(dir.path(), &["--json", "--first-wins"]);
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["dedupe"]["compatibility"], "first-wins");
    assert_eq!(json["dedupe"]["doomed"].as_array().unwrap().len(), 1);
}

#[test]
fn test_dry_run_deletes_nothing() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "1.2.0", "^1.0.0");

    let output = run_in(dir.path(), &["--dry-run"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would remove c@1.2.0"), "stdout: {stdout}");
    assert!(dir.path().join("node_modules/a/node_modules/c").exists());
    assert!(dir.path().join("node_modules/b/node_modules/c").exists());
}

#[test]
fn test_path_flag() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("project");
    nested_project(&project, "1.2.0", "^1.0.0");

    let output = run_in(dir.path(), &["--json", "--path", "project", "--dry-run"]);
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert_eq!(json["dedupe"]["dry_run"], true);
    assert_eq!(json["dedupe"]["doomed"].as_array().unwrap().len(), 1);
}

#[test]
fn test_missing_package_json_fails() {
    let dir = tempdir().unwrap();

    let output = run_in(dir.path(), &["--json"]);
    assert_eq!(output.status.code(), Some(1));

    let json = parse_stdout(&output);
    assert_eq!(json["ok"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("DEDUPE_MANIFEST_NOT_FOUND"));
}

#[test]
fn test_inconsistent_install_fails_without_deleting() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "1.2.0", "^1.0.0");
    write_package(
        dir.path(),
        "app",
        "1.0.0",
        serde_json::json!({ "a": "^1.0.0", "b": "^1.0.0", "broken": "^1.0.0" }),
    );
    fs::create_dir_all(dir.path().join("node_modules/broken")).unwrap();

    let output = run_in(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Inconsistent install"), "stderr: {stderr}");
    assert!(dir.path().join("node_modules/a/node_modules/c").exists());
    assert!(dir.path().join("node_modules/b/node_modules/c").exists());
}

#[test]
fn test_stderr_has_no_json_by_default() {
    let dir = tempdir().unwrap();
    nested_project(dir.path(), "1.2.0", "^1.0.0");

    let output = run_in(dir.path(), &["--json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    for line in stderr.lines() {
        assert!(
            !line.trim().starts_with('{'),
            "stderr should not contain JSON: {line}"
        );
    }
    assert!(stderr.contains("Removing duplicate dependency"));
}

#[test]
fn test_dev_collision_warns_once_per_name() {
    let dir = tempdir().unwrap();
    let manifest = serde_json::json!({
        "name": "app",
        "version": "1.0.0",
        "dependencies": { "shared": "^1.0.0", "same": "1.0.0" },
        "devDependencies": { "shared": "^2.0.0", "same": "1.0.0", "tool": "^1.0.0" }
    });
    fs::write(dir.path().join("package.json"), manifest.to_string()).unwrap();
    write_package(
        &dir.path().join("node_modules/shared"),
        "shared",
        "1.0.0",
        serde_json::json!({}),
    );

    let output = run_in(dir.path(), &["-d", "--dry-run"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warnings: Vec<&str> = stderr
        .lines()
        .filter(|line| line.contains("was found in dependencies"))
        .collect();
    assert_eq!(warnings.len(), 1, "stderr: {stderr}");
    assert!(warnings[0].contains("shared"));
    assert!(warnings[0].contains("^1.0.0"));
    assert!(warnings[0].contains("^2.0.0"));

    let output = run_in(dir.path(), &["--dry-run"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("was found in dependencies"), "stderr: {stderr}");
}

#[test]
fn test_missing_dependency_is_traced() {
    let dir = tempdir().unwrap();
    write_package(
        dir.path(),
        "app",
        "1.0.0",
        serde_json::json!({ "ghost": "^1.0.0" }),
    );

    let output = run_in(dir.path(), &["-vv", "--json"]);
    assert!(output.status.success());

    let json = parse_stdout(&output);
    assert!(json["dedupe"]["doomed"].as_array().unwrap().is_empty());
    assert!(json["dedupe"]["accepted"].as_object().unwrap().is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("dependency ghost not found on disk"),
        "stderr: {stderr}"
    );
}
