//! Isolated evaluation of template bodies.
//!
//! An [`Evaluator`] runs one template body with exactly the [`Bindings`] it is
//! given. The body may return a value and may write text to the ambient output
//! channel ([`crate::templating::output`]); capturing that text is the caller's
//! job, not the evaluator's.
//!
//! # Implementations
//!
//! - [`FnEvaluator`]: the body is a Rust closure that receives `&Bindings` and
//!   nothing else
//! - [`FileEvaluator`]: the body is a tera template file, re-read on every
//!   evaluation, whose only functions are `c` and `f`
//! - [`CatalogEvaluator`]: the body is looked up by location in a shared
//!   [`BodyCatalog`] on every evaluation
//!
//! Errors raised by a body are returned unmodified inside an
//! [`EvaluationError`]; interpreting them is left to the template.

mod catalog;
pub mod factory;
mod file;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::templating::bindings::Bindings;
use crate::templating::error::EvaluationError;

pub use catalog::{BodyCatalog, CatalogEvaluator};
pub use factory::{EvaluatorFactory, FileEvaluatorFactory, TemplateFactory};
pub use file::FileEvaluator;

/// A template body written as a Rust closure.
pub type Body = Arc<dyn Fn(&Bindings) -> anyhow::Result<Value> + Send + Sync>;

/// Something that executes a template body against a set of bindings.
pub trait Evaluator: Send + Sync {
    /// Run the body and return its result value.
    ///
    /// # Errors
    ///
    /// Returns whatever the body raised, wrapped in [`EvaluationError`]
    /// without reinterpretation.
    fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvaluationError>;

    /// Where the body comes from, if it has a location.
    fn location(&self) -> Option<&Path> {
        None
    }

    /// Short human-readable description used in diagnostics.
    fn describe(&self) -> String {
        match self.location() {
            Some(path) => path.display().to_string(),
            None => "<inline>".to_string(),
        }
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvaluationError> {
        (**self).evaluate(bindings)
    }

    fn location(&self) -> Option<&Path> {
        (**self).location()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Evaluates a closure body.
#[derive(Clone)]
pub struct FnEvaluator {
    body: Body,
}

impl FnEvaluator {
    /// Wrap `body` as an evaluator.
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Bindings) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Wrap an already shared body.
    pub fn from_body(body: Body) -> Self {
        Self {
            body,
        }
    }
}

impl Evaluator for FnEvaluator {
    fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvaluationError> {
        (self.body)(bindings).map_err(EvaluationError::from)
    }
}

impl fmt::Debug for FnEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnEvaluator(<inline>)")
    }
}
