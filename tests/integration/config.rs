//! Configuration discovery through the binary.

use crate::common::TestProject;

const PAGE: &str = r#"{{ c(key="greeting") }}, {{ c(key="name", default="you") }}"#;

#[test]
fn test_home_config_supplies_defaults() {
    let project = TestProject::new().unwrap();
    project.write_file("templates/page.tera", PAGE).unwrap();
    let template_dir = project.project_path().join("templates");
    project
        .write_home_config(&format!(
            "template_dir = {:?}\n\n[defaults]\ngreeting = \"Hello\"\n",
            template_dir.display().to_string()
        ))
        .unwrap();

    let output = project.run_isotemplate(&["render", "page.tera"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "Hello, you");
}

#[test]
fn test_explicit_config_wins_over_env_and_home() {
    let project = TestProject::new().unwrap();
    project.write_file("page.tera", PAGE).unwrap();
    project.write_home_config("[defaults]\ngreeting = \"home\"\n").unwrap();
    let env_config = project.write_file("env.toml", "[defaults]\ngreeting = \"env\"\n").unwrap();
    project.write_file("flag.toml", "[defaults]\ngreeting = \"flag\"\n").unwrap();

    let env = [("ISOTEMPLATE_CONFIG", env_config.to_str().unwrap())];

    let output = project.run_isotemplate_with_env(&["render", "page.tera"], &env).unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "env, you");

    let output = project
        .run_isotemplate_with_env(&["--config", "flag.toml", "render", "page.tera"], &env)
        .unwrap();
    output.assert_success();
    assert_eq!(output.stdout, "flag, you");
}

#[test]
fn test_missing_explicit_config_fails() {
    let project = TestProject::new().unwrap();
    project.write_file("page.tera", PAGE).unwrap();

    let output =
        project.run_isotemplate(&["--config", "nowhere.toml", "render", "page.tera"]).unwrap();
    output.assert_failure();
    output.assert_stderr_contains("Configuration file not found");
}

#[test]
fn test_invalid_config_reports_file() {
    let project = TestProject::new().unwrap();
    project.write_file("broken.toml", "builtins = = true").unwrap();

    let output = project.run_isotemplate(&["--config", "broken.toml", "functions"]).unwrap();
    output.assert_failure();
    output.assert_stderr_contains("broken.toml");
}

#[test]
fn test_builtins_can_be_disabled() {
    let project = TestProject::new().unwrap();
    project.write_file("bare.toml", "builtins = false\n").unwrap();

    let output = project.run_isotemplate(&["--config", "bare.toml", "functions"]).unwrap();
    output.assert_success();
    assert_eq!(output.stdout.trim(), "No functions registered");
}
