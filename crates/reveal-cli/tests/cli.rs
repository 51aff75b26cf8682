//! End-to-end CLI tests: build a real binary invocation against sample
//! files in a tempdir, the way the rest of the pack tests a whole engine
//! rather than its internals.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::TempDir;

fn reveal() -> Command {
    Command::cargo_bin("reveal").expect("reveal binary")
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut f = std::fs::File::create(&path).expect("create sample file");
    f.write_all(contents.as_bytes()).expect("write sample file");
    path
}

#[test]
fn list_supported_includes_core_schemes() {
    reveal()
        .arg("--list-supported")
        .assert()
        .success()
        .stdout(predicate::str::contains("file"))
        .stdout(predicate::str::contains("git"))
        .stdout(predicate::str::contains("json"));
}

#[test]
fn rules_lists_every_builtin_code() {
    reveal()
        .arg("--rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("C001"))
        .stdout(predicate::str::contains("F003"))
        .stdout(predicate::str::contains("V001"));
}

#[test]
fn capabilities_emits_valid_json() {
    let output = reveal().arg("--capabilities").output().expect("run reveal");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("capabilities is valid JSON");
    assert!(parsed["adapters"].is_array());
    assert!(parsed["rules"].is_array());
}

#[test]
fn unknown_scheme_exits_two_with_suggestion() {
    reveal()
        .arg("flie://whatever")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("did you mean"));
}

#[test]
fn no_target_and_no_stdin_exits_two() {
    reveal().assert().code(2);
}

#[test]
fn missing_file_exits_one() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("does-not-exist.py");
    reveal().arg(missing.to_str().unwrap()).assert().code(1);
}

#[test]
fn bare_path_promotes_to_file_and_renders_json() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir, "sample.py", "def greet(name):\n    return f\"hello {name}\"\n");

    let output = reveal()
        .current_dir(dir.path())
        .arg("sample.py")
        .arg("--format")
        .arg("json")
        .output()
        .expect("run reveal");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("file structure is valid JSON");
    assert_eq!(parsed["contract_version"], "1.0");
    assert!(parsed["categories"]["functions"].is_array());
}

#[test]
fn markdown_missing_title_fails_check_with_exit_three() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir, "post.md", "---\ndate: 2024-01-01\n---\n\n# Body\n");

    reveal()
        .current_dir(dir.path())
        .arg("markdown://post.md")
        .arg("--check")
        .assert()
        .code(3)
        .stdout(predicate::str::contains("F003"));
}

#[test]
fn unknown_select_code_exits_two_without_running_rules() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir, "post.md", "---\ndate: 2024-01-01\n---\n\n# Body\n");

    reveal()
        .current_dir(dir.path())
        .arg("markdown://post.md")
        .arg("--check")
        .arg("--select")
        .arg("Z999")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown rule code"));
}

#[test]
fn markdown_with_title_passes_check() {
    let dir = TempDir::new().expect("tempdir");
    write_file(&dir, "post.md", "---\ntitle: Hello\ndate: 2024-01-01\n---\n\n# Body\n");

    reveal()
        .current_dir(dir.path())
        .arg("markdown://post.md")
        .arg("--check")
        .assert()
        .code(0);
}

#[test]
fn ast_query_filters_by_complexity_and_sorts_descending() {
    let dir = TempDir::new().expect("tempdir");
    write_file(
        &dir,
        "branchy.py",
        "def simple():\n    return 1\n\n\ndef complex_fn(x):\n    if x > 0:\n        if x > 1:\n            if x > 2:\n                return 3\n            return 2\n        return 1\n    return 0\n",
    );

    let output = reveal()
        .current_dir(dir.path())
        .arg("ast://branchy.py?complexity>1&sort=-complexity")
        .arg("--format")
        .arg("json")
        .output()
        .expect("run reveal");
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("ast structure is valid JSON");
    let functions = parsed["categories"]["functions"].as_array().expect("functions category");
    assert!(functions.iter().all(|f| f["name"] == "complex_fn"));
}

#[test]
fn explain_file_reports_detected_language() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(&dir, "main.rs", "fn main() {}\n");

    reveal()
        .arg("--explain-file")
        .arg(path.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("rust"));
}
