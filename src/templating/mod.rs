//! Template rendering with isolated bodies.
//!
//! A [`Template`] composes three things:
//!
//! - an [`Evaluator`] that runs the template body,
//! - a default context, consulted when a render context lacks a key,
//! - a [`FunctionRegistry`] of helpers the body may call.
//!
//! Rendering hands the body exactly two bindings, `c` and `f` (see
//! [`bindings`]), captures everything the body writes to the ambient output
//! channel (see [`output`]), and returns that text.
//!
//! # Rendering Lifecycle
//!
//! Each call to [`Template::render`] moves through the same states:
//!
//! 1. **Bindings**: the context is validated and the `c` / `f` closures are
//!    built. A context of the wrong shape fails here with
//!    [`RenderError::Setup`]; no body code has run.
//! 2. **Capturing**: an output capture is opened on the current thread.
//! 3. **Evaluation**: the body runs. On success the captured text is the
//!    result; on failure the capture is discarded and the error is wrapped in
//!    [`RenderError::Evaluation`] together with the context.
//!
//! Output is all-or-nothing: a failed render never returns or leaks partial
//! text. The body's own return value is not part of `render`'s result; use
//! [`Template::render_full`] when it is needed.
//!
//! # Examples
//!
//! ```
//! use isotemplate::echo;
//! use isotemplate::evaluator::FnEvaluator;
//! use isotemplate::templating::Template;
//! use isotemplate::templating::functions::FunctionRegistry;
//! use serde_json::{Map, Value, json};
//!
//! let body = FnEvaluator::new(|b| {
//!     echo!("{} ", b.c("greeting")?.as_str().unwrap_or_default());
//!     let name = b.c_or("name", "world")?;
//!     echo!("{}", b.f("shout", &[name])?.as_str().unwrap_or_default());
//!     Ok(Value::Null)
//! });
//!
//! let mut defaults = Map::new();
//! defaults.insert("greeting".to_string(), json!("Hi"));
//! let functions = FunctionRegistry::new()
//!     .with("shout", |args| Ok(json!(args[0].as_str().unwrap_or_default().to_uppercase())));
//!
//! let template = Template::new(body, defaults, functions);
//! assert_eq!(template.render(()).unwrap(), "Hi WORLD");
//! assert_eq!(template.render(json!({"name": "alice"})).unwrap(), "Hi ALICE");
//! ```

pub mod bindings;
pub mod builtins;
pub mod context;
pub mod error;
pub mod functions;
pub mod output;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::evaluator::Evaluator;

pub use bindings::{Bindings, CONTEXT_BINDING, FUNCTION_BINDING};
pub use context::{Context, ContextService, Indexable, IntoContext, resolve};
pub use error::{ContextError, EvaluationError, FactoryError, FunctionNotFound, RenderError};
pub use functions::{FunctionRegistry, TemplateFunction};

/// Result of [`Template::render_full`]: the captured text and the body's value.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    /// Everything the body wrote
    pub output: String,
    /// What the body returned
    pub value: Value,
}

struct TemplateInner {
    name: Option<String>,
    evaluator: Box<dyn Evaluator>,
    default_context: Arc<Map<String, Value>>,
    functions: Arc<FunctionRegistry>,
}

/// A reusable, immutable template.
///
/// Cloning is cheap and yields a handle to the same template; errors keep
/// such a handle to identify the template that failed.
#[derive(Clone)]
pub struct Template {
    inner: Arc<TemplateInner>,
}

impl Template {
    /// Create a template from an evaluator, default context and functions.
    pub fn new(
        evaluator: impl Evaluator + 'static,
        default_context: Map<String, Value>,
        functions: FunctionRegistry,
    ) -> Self {
        Self::builder(evaluator).default_context(default_context).functions(functions).build()
    }

    /// Start building a template around `evaluator`.
    pub fn builder(evaluator: impl Evaluator + 'static) -> TemplateBuilder {
        TemplateBuilder::new(Box::new(evaluator))
    }

    /// Display name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Location of the body, if the evaluator has one.
    pub fn location(&self) -> Option<&Path> {
        self.inner.evaluator.location()
    }

    /// Name used in diagnostics: the given name, else the evaluator's description.
    pub fn display_name(&self) -> String {
        match &self.inner.name {
            Some(name) => name.clone(),
            None => self.inner.evaluator.describe(),
        }
    }

    pub fn default_context(&self) -> &Map<String, Value> {
        &self.inner.default_context
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.inner.functions
    }

    /// Render with `context` and return the produced text.
    ///
    /// `context` may be a [`Context`], a JSON object, a map, or `()` / `None`
    /// to render with defaults only.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Setup`] if the context has an unsupported shape
    /// - [`RenderError::Evaluation`] if the body fails; no output is returned
    pub fn render(&self, context: impl IntoContext) -> Result<String, RenderError> {
        self.render_full(context).map(|rendition| rendition.output)
    }

    /// Like [`render`](Self::render), but also return the body's value.
    pub fn render_full(&self, context: impl IntoContext) -> Result<Rendition, RenderError> {
        let context = context.into_context().map_err(|source| {
            tracing::debug!("Rejected context for template '{}': {}", self.display_name(), source);
            RenderError::Setup {
                template: self.clone(),
                source,
            }
        })?;
        let bindings = self.bindings(&context);

        tracing::debug!(
            "Rendering template '{}' with {} context",
            self.display_name(),
            context.kind()
        );

        let capture = output::Capture::begin();
        match self.inner.evaluator.evaluate(&bindings) {
            Ok(value) => {
                let output = capture.finish();
                tracing::debug!(
                    "Template '{}' rendered {} bytes",
                    self.display_name(),
                    output.len()
                );
                Ok(Rendition {
                    output,
                    value,
                })
            }
            Err(source) => {
                drop(capture);
                tracing::debug!("Template '{}' failed: {:#}", self.display_name(), source.inner());
                Err(RenderError::Evaluation {
                    template: self.clone(),
                    context,
                    source,
                })
            }
        }
    }

    /// Build the `c` and `f` bindings for one render.
    fn bindings(&self, context: &Context) -> Bindings {
        let context = context.clone();
        let defaults = Arc::clone(&self.inner.default_context);
        let functions = Arc::clone(&self.inner.functions);

        Bindings::new(
            Arc::new(move |key: &str, default: Option<Value>| {
                resolve(&context, key, default, &defaults)
            }),
            Arc::new(move |name: &str, args: &[Value]| functions.invoke(name, args)),
        )
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("name", &self.display_name())
            .field("default_context", &self.inner.default_context.keys().collect::<Vec<_>>())
            .field("functions", &self.inner.functions)
            .finish()
    }
}

/// Builder for [`Template`].
pub struct TemplateBuilder {
    name: Option<String>,
    evaluator: Box<dyn Evaluator>,
    default_context: Map<String, Value>,
    functions: FunctionRegistry,
}

impl TemplateBuilder {
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            name: None,
            evaluator,
            default_context: Map::new(),
            functions: FunctionRegistry::new(),
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn default_context(mut self, default_context: Map<String, Value>) -> Self {
        self.default_context = default_context;
        self
    }

    /// Add a single default value.
    #[must_use]
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.default_context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = functions;
        self
    }

    pub fn build(self) -> Template {
        Template {
            inner: Arc::new(TemplateInner {
                name: self.name,
                evaluator: self.evaluator,
                default_context: Arc::new(self.default_context),
                functions: Arc::new(self.functions),
            }),
        }
    }
}
