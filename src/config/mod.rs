//! Engine configuration.
//!
//! The `isotemplate` binary reads an optional TOML file describing how
//! templates are located and what every template gets by default:
//!
//! ```toml
//! # Base directory for relative template locations
//! template_dir = "templates"
//!
//! # Register the builtin function library (upper, lower, join, ...)
//! builtins = true
//!
//! # Default context shared by every template
//! [defaults]
//! greeting = "Hi"
//! ```
//!
//! # Location
//!
//! The file is looked up in this order, first match wins:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. The `ISOTEMPLATE_CONFIG` environment variable
//! 3. `~/.isotemplate/config.toml`, only if it exists
//!
//! An explicitly named file must exist. With no file at all,
//! [`EngineConfig::default`] is used.

mod parser;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::IsotemplateError;
use crate::evaluator::{FileEvaluatorFactory, TemplateFactory};
use crate::templating::builtins::register_builtins;
use crate::templating::functions::FunctionRegistry;

pub use parser::{DataFormat, parse_config, parse_data_file};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "ISOTEMPLATE_CONFIG";

const fn default_builtins() -> bool {
    true
}

/// Settings for building templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base directory for relative template locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<PathBuf>,

    /// Whether the builtin functions are registered.
    #[serde(default = "default_builtins")]
    pub builtins: bool,

    /// Default context attached to every template.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub defaults: Map<String, Value>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            builtins: default_builtins(),
            defaults: Map::new(),
        }
    }
}

impl EngineConfig {
    /// Load the configuration, honouring an explicit path if given.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly named file (flag or environment)
    /// is missing or invalid, or if the default file exists but is invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = std::env::var_os(CONFIG_ENV_VAR);
        match Self::resolve_path(explicit, env, Self::default_path().ok()) {
            Some(ConfigLocation::Required(path)) => {
                if !path.exists() {
                    return Err(IsotemplateError::ConfigNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Self::load_from(&path)
            }
            Some(ConfigLocation::Optional(path)) if path.exists() => Self::load_from(&path),
            _ => {
                tracing::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from '{}'", path.display());
        parse_config(path)
    }

    /// `~/.isotemplate/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home.join(".isotemplate").join("config.toml"))
    }

    fn resolve_path(
        explicit: Option<&Path>,
        env: Option<OsString>,
        default: Option<PathBuf>,
    ) -> Option<ConfigLocation> {
        if let Some(path) = explicit {
            return Some(ConfigLocation::Required(path.to_path_buf()));
        }
        if let Some(path) = env.filter(|value| !value.is_empty()) {
            return Some(ConfigLocation::Required(PathBuf::from(path)));
        }
        default.map(ConfigLocation::Optional)
    }

    /// The function registry implied by this configuration.
    pub fn functions(&self) -> FunctionRegistry {
        let mut registry = FunctionRegistry::new();
        if self.builtins {
            register_builtins(&mut registry);
        }
        registry
    }

    /// A template factory that reads tera files, relative to `template_dir`.
    pub fn template_factory(&self) -> TemplateFactory {
        self.template_factory_with(FunctionRegistry::new())
    }

    /// Like [`template_factory`](Self::template_factory), with extra
    /// functions registered over the builtins.
    pub fn template_factory_with(&self, extra: FunctionRegistry) -> TemplateFactory {
        let evaluators = match &self.template_dir {
            Some(dir) => FileEvaluatorFactory::with_base_dir(dir),
            None => FileEvaluatorFactory::new(),
        };

        let mut functions = self.functions();
        functions.extend(&extra);

        TemplateFactory::new(Arc::new(evaluators), self.defaults.clone(), functions)
    }
}

#[derive(Debug, PartialEq)]
enum ConfigLocation {
    /// Named by the user; must exist
    Required(PathBuf),
    /// Conventional location; used only if present
    Optional(PathBuf),
}
