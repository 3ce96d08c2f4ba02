//! Shared helpers for isotemplate integration tests.

#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A temporary working directory with an isolated home directory.
pub struct TestProject {
    _temp_dir: TempDir,
    project_dir: PathBuf,
    home_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let home_dir = temp_dir.path().join("home");
        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&home_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            home_dir,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn home_path(&self) -> &Path {
        &self.home_dir
    }

    /// Write a file relative to the project directory.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write `~/.isotemplate/config.toml` inside the isolated home.
    pub fn write_home_config(&self, content: &str) -> Result<PathBuf> {
        let dir = self.home_dir.join(".isotemplate");
        fs::create_dir_all(&dir)?;
        let path = dir.join("config.toml");
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn read_file(&self, relative: &str) -> Result<String> {
        let path = self.project_dir.join(relative);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Run the isotemplate binary in the project directory.
    pub fn run_isotemplate(&self, args: &[&str]) -> Result<CommandOutput> {
        self.run_isotemplate_with_env(args, &[])
    }

    pub fn run_isotemplate_with_env(
        &self,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<CommandOutput> {
        let binary = env!("CARGO_BIN_EXE_isotemplate");
        let mut command = Command::new(binary);
        command
            .args(args)
            .current_dir(&self.project_dir)
            .env("HOME", &self.home_dir)
            .env("NO_COLOR", "1")
            .env_remove("ISOTEMPLATE_CONFIG")
            .env_remove("RUST_LOG");
        for (key, value) in env {
            command.env(key, value);
        }

        let output = command.output().context("Failed to run isotemplate command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}

/// Captured result of a command run.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    /// Assert the command succeeded
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    /// Assert the command failed with exit code 1
    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        assert_eq!(self.code, Some(1));
        self
    }

    /// Assert stdout contains the given text
    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Expected stdout to contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    /// Assert stderr contains the given text
    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
