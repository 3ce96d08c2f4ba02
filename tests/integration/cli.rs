//! The `isotemplate` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use crate::common::TestProject;

fn isotemplate(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("isotemplate").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("ISOTEMPLATE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_render_with_set_values() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("hello.tera"),
        r#"{% set name = c(key="name", default="world") %}Hello {{ f(name="upper", args=name) }}"#,
    )
    .unwrap();

    isotemplate(&dir)
        .args(["render", "hello.tera"])
        .assert()
        .success()
        .stdout("Hello WORLD");

    isotemplate(&dir)
        .args(["render", "hello.tera", "--set", "name=alice"])
        .assert()
        .success()
        .stdout("Hello ALICE");
}

#[test]
fn test_render_with_context_file_and_override() {
    let project = TestProject::new().unwrap();
    project.write_file("page.tera", r#"{{ c(key="title") }} by {{ c(key="author") }}"#).unwrap();
    project.write_file("ctx.yaml", "title: Notes\nauthor: ann\n").unwrap();

    let output = project
        .run_isotemplate(&["render", "page.tera", "--context", "ctx.yaml", "--set", "author=bo"])
        .unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "Notes by bo");
}

#[test]
fn test_render_json_values_from_set() {
    let project = TestProject::new().unwrap();
    project
        .write_file(
            "count.tera",
            r#"{% set items = c(key="items") %}{{ f(name="length", args=[items]) }}"#,
        )
        .unwrap();

    let output =
        project.run_isotemplate(&["render", "count.tera", "--set", r#"items=[1,2,3]"#]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "3");
}

#[test]
fn test_render_to_output_file() {
    let project = TestProject::new().unwrap();
    project.write_file("page.tera", "static text").unwrap();

    let output =
        project.run_isotemplate(&["render", "page.tera", "--output", "out/page.txt"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "");
    assert_eq!(project.read_file("out/page.txt").unwrap(), "static text");
}

#[test]
fn test_unknown_function_fails_without_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("bad.tera"), r#"partial {{ f(name="uppr", args="x") }}"#)
        .unwrap();

    isotemplate(&dir)
        .args(["render", "bad.tera"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("does not exist"))
        .stderr(predicate::str::contains("Did you mean: upper?"))
        .stderr(predicate::str::contains("isotemplate functions"));
}

#[test]
fn test_missing_template_reported() {
    let dir = TempDir::new().unwrap();

    isotemplate(&dir)
        .args(["render", "ghost.tera"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found"));
}

#[test]
fn test_invalid_set_argument() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("page.tera"), "x").unwrap();

    isotemplate(&dir)
        .args(["render", "page.tera", "--set", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn test_context_file_must_be_a_table() {
    let project = TestProject::new().unwrap();
    project.write_file("page.tera", "x").unwrap();
    project.write_file("ctx.json", "[1, 2]").unwrap();

    let output =
        project.run_isotemplate(&["render", "page.tera", "--context", "ctx.json"]).unwrap();
    output.assert_failure();
    output.assert_stderr_contains("Invalid context from");
}

#[test]
fn test_functions_lists_builtins() {
    let dir = TempDir::new().unwrap();

    isotemplate(&dir)
        .arg("functions")
        .assert()
        .success()
        .stdout(predicate::str::contains("upper"))
        .stdout(predicate::str::contains("escape_html"));
}

#[test]
fn test_functions_json_format() {
    let dir = TempDir::new().unwrap();

    let assert = isotemplate(&dir).args(["functions", "--format", "json"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let names: Vec<String> = serde_json::from_str(&stdout).unwrap();
    assert!(names.contains(&"join".to_string()));
    assert_eq!(names.len(), 8);
}

#[test]
fn test_verbose_logs_to_stderr_only() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("page.tera"), "clean").unwrap();

    isotemplate(&dir)
        .args(["--verbose", "render", "page.tera"])
        .assert()
        .success()
        .stdout("clean")
        .stderr(predicate::str::contains("Rendering template"));
}
