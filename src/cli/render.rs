//! The `render` command.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::config::{EngineConfig, parse_data_file};
use crate::core::IsotemplateError;
use crate::templating::bindings::describe_value;

/// Render a tera template file.
///
/// The context is assembled from `--context` first, then each `--set` in
/// order; later values replace earlier ones. Keys missing from the context
/// fall back to the `[defaults]` of the configuration.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Template file, relative to `template_dir` if one is configured
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Context file (.json, .toml, .yaml or .yml)
    #[arg(long, value_name = "FILE")]
    pub context: Option<PathBuf>,

    /// Set a context value; the value is parsed as JSON if possible
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Write the output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    pub fn execute(&self, engine: &EngineConfig) -> Result<()> {
        let context = self.build_context()?;

        let template = engine.template_factory().from_location(&self.template)?;
        if let Some(path) = template.location() {
            if !path.is_file() {
                return Err(IsotemplateError::TemplateNotFound {
                    path: path.display().to_string(),
                }
                .into());
            }
        }

        let rendered = template.render(context)?;

        match &self.output {
            Some(path) => write_output(path, &rendered)?,
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(rendered.as_bytes()).context("Failed to write to stdout")?;
                stdout.flush().context("Failed to write to stdout")?;
            }
        }

        Ok(())
    }

    /// Merge the context file and `--set` assignments into one mapping.
    pub fn build_context(&self) -> Result<Map<String, Value>> {
        let mut context = match &self.context {
            Some(path) => match parse_data_file(path)? {
                Value::Object(map) => map,
                other => {
                    return Err(IsotemplateError::InvalidContext {
                        origin: path.display().to_string(),
                        reason: format!(
                            "expected a table of keys, found {}",
                            describe_value(&other)
                        ),
                    }
                    .into());
                }
            },
            None => Map::new(),
        };

        for assignment in &self.set {
            let (key, value) = parse_assignment(assignment)?;
            tracing::debug!("Setting context key '{}' from --set", key);
            context.insert(key, value);
        }

        Ok(context)
    }
}

/// Split `key=value`, parsing the value as JSON when it is valid JSON.
///
/// ```
/// use isotemplate::cli::parse_assignment;
/// use serde_json::json;
///
/// assert_eq!(parse_assignment("n=3").unwrap(), ("n".to_string(), json!(3)));
/// assert_eq!(parse_assignment("name=alice").unwrap(), ("name".to_string(), json!("alice")));
/// ```
///
/// # Errors
///
/// Fails with [`IsotemplateError::InvalidAssignment`] if there is no `=` or
/// the key is empty.
pub fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = assignment.split_once('=') else {
        return Err(IsotemplateError::InvalidAssignment {
            assignment: assignment.to_string(),
        }
        .into());
    };

    let key = key.trim();
    if key.is_empty() {
        return Err(IsotemplateError::InvalidAssignment {
            assignment: assignment.to_string(),
        }
        .into());
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    tracing::debug!("Wrote {} bytes to '{}'", content.len(), path.display());
    Ok(())
}
