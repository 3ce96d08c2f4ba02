//! Parsing of configuration and context data files.
//!
//! Two entry points live here:
//!
//! - [`parse_config`] reads a TOML file into any deserializable type.
//! - [`parse_data_file`] reads a JSON, TOML or YAML file into a JSON value,
//!   choosing the format by extension. The CLI uses it for `--context`.
//!
//! Errors carry the file path; the underlying I/O or syntax error is kept as
//! the cause.
//!
//! ```text
//! Failed to parse config file: /path/to/config.toml
//! Caused by:
//!     invalid TOML value, expected string
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::core::IsotemplateError;

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Toml,
    Yaml,
}

impl DataFormat {
    /// Detect the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use isotemplate::config::parse_config;
/// use serde::Deserialize;
/// use std::path::Path;
///
/// #[derive(Deserialize)]
/// struct Config {
///     name: String,
/// }
///
/// # fn example() -> anyhow::Result<()> {
/// let config: Config = parse_config(Path::new("settings.toml"))?;
/// println!("Loaded {}", config.name);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read or its content does not
/// deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Parse a JSON, TOML or YAML data file into a JSON value.
///
/// # Errors
///
/// Fails with [`IsotemplateError::UnsupportedDataFormat`] for an unknown
/// extension, otherwise with the read or parse error for `path`.
pub fn parse_data_file(path: &Path) -> Result<Value> {
    let format = DataFormat::from_path(path).ok_or_else(|| {
        IsotemplateError::UnsupportedDataFormat {
            path: path.display().to_string(),
        }
    })?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;

    tracing::debug!("Parsing {:?} data file '{}'", format, path.display());

    let value: Value = match format {
        DataFormat::Json => serde_json::from_str::<Value>(&content).map_err(anyhow::Error::from),
        DataFormat::Toml => toml::from_str::<Value>(&content).map_err(anyhow::Error::from),
        DataFormat::Yaml => serde_yaml::from_str::<Value>(&content).map_err(anyhow::Error::from),
    }
    .with_context(|| format!("Failed to parse data file: {}", path.display()))?;

    Ok(value)
}
