//! Turning locations into evaluators and ready-to-use templates.
//!
//! Two layers cooperate here:
//!
//! - An [`EvaluatorFactory`] knows how to obtain an [`Evaluator`] for a
//!   location. How the body is found is entirely up to the implementation.
//! - A [`TemplateFactory`] asks an evaluator factory for the evaluator and
//!   attaches the default context and functions every template it produces
//!   shares.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use isotemplate::evaluator::{FileEvaluatorFactory, TemplateFactory};
//! use isotemplate::templating::functions::FunctionRegistry;
//! use serde_json::{Map, json};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut defaults = Map::new();
//! defaults.insert("greeting".to_string(), json!("Hi"));
//!
//! let factory = TemplateFactory::new(
//!     Arc::new(FileEvaluatorFactory::with_base_dir("templates")),
//!     defaults,
//!     FunctionRegistry::new(),
//! );
//!
//! let template = factory.from_location(Path::new("hello.tera"))?;
//! println!("{}", template.render(json!({"name": "alice"}))?);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Evaluator, FileEvaluator};
use crate::templating::error::FactoryError;
use crate::templating::functions::FunctionRegistry;
use crate::templating::{Template, TemplateBuilder};

/// Produces evaluators for template locations.
pub trait EvaluatorFactory: Send + Sync {
    /// Create an evaluator for the body at `location`.
    ///
    /// # Errors
    ///
    /// Returns a [`FactoryError`] if the location cannot identify a body.
    fn from_location(&self, location: &Path) -> Result<Box<dyn Evaluator>, FactoryError>;
}

/// Creates [`FileEvaluator`]s, optionally relative to a base directory.
///
/// Files are not opened here: the evaluator reads its file on every
/// evaluation, so a missing file surfaces as a render failure.
#[derive(Debug, Clone, Default)]
pub struct FileEvaluatorFactory {
    base_dir: Option<PathBuf>,
}

impl FileEvaluatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locations against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn resolve_path(&self, location: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if location.is_relative() => base.join(location),
            _ => location.to_path_buf(),
        }
    }
}

impl EvaluatorFactory for FileEvaluatorFactory {
    fn from_location(&self, location: &Path) -> Result<Box<dyn Evaluator>, FactoryError> {
        if location.as_os_str().is_empty() {
            return Err(FactoryError::InvalidLocation {
                location: String::new(),
                reason: "path is empty".to_string(),
            });
        }

        let path = self.resolve_path(location);
        tracing::debug!("Creating file evaluator for '{}'", path.display());
        Ok(Box::new(FileEvaluator::new(path)))
    }
}

/// Builds templates that share a default context and function registry.
#[derive(Clone)]
pub struct TemplateFactory {
    evaluators: Arc<dyn EvaluatorFactory>,
    default_context: Map<String, Value>,
    functions: FunctionRegistry,
}

impl TemplateFactory {
    pub fn new(
        evaluators: Arc<dyn EvaluatorFactory>,
        default_context: Map<String, Value>,
        functions: FunctionRegistry,
    ) -> Self {
        Self {
            evaluators,
            default_context,
            functions,
        }
    }

    /// The default context attached to every template.
    pub fn default_context(&self) -> &Map<String, Value> {
        &self.default_context
    }

    /// The functions attached to every template.
    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Create a template for the body at `location`.
    ///
    /// # Errors
    ///
    /// Returns the evaluator factory's error if the location is unusable.
    pub fn from_location(&self, location: &Path) -> Result<Template, FactoryError> {
        let evaluator = self.evaluators.from_location(location)?;
        Ok(TemplateBuilder::new(evaluator)
            .name(location.display().to_string())
            .default_context(self.default_context.clone())
            .functions(self.functions.clone())
            .build())
    }
}

impl std::fmt::Debug for TemplateFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateFactory")
            .field("default_context", &self.default_context)
            .field("functions", &self.functions)
            .finish_non_exhaustive()
    }
}
