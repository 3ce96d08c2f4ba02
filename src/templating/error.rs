//! Error types for template rendering.
//!
//! Every failure a render can produce is represented here. Errors are wrapped
//! exactly once at each boundary that adds diagnostic information:
//!
//! - The context resolver reports [`ContextError`]. When that happens while the
//!   bindings are being assembled it is wrapped into [`RenderError::Setup`].
//! - A template function that is not registered reports [`FunctionNotFound`].
//! - Anything the body raises surfaces as [`EvaluationError`], which the template
//!   wraps into [`RenderError::Evaluation`] together with the context it was
//!   rendered with.
//!
//! [`RenderError::format_with_context`] turns any render failure into a
//! multi-line, user-facing report.

use std::fmt::Write as _;

use thiserror::Error;

use super::Template;
use super::context::Context;

/// Failure while resolving a value from a render context.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The supplied context is not one of the accepted shapes.
    ///
    /// Accepted shapes are a key/value mapping, an [`Indexable`] object, or a
    /// [`ContextService`]. Raised before any body code executes.
    ///
    /// [`Indexable`]: super::context::Indexable
    /// [`ContextService`]: super::context::ContextService
    #[error(
        "Context must be a key/value mapping, an indexable object, or a lookup service (got {found})"
    )]
    InvalidShape {
        /// Short description of what was supplied instead
        found: String,
    },

    /// A lookup service reported the key as present but failed to produce it.
    #[error("Could not retrieve value for key \"{key}\"")]
    Lookup {
        /// The key being resolved
        key: String,
        /// The error raised by the service
        #[source]
        source: anyhow::Error,
    },
}

/// A template invoked a function name that is not registered.
#[derive(Debug, Clone, Error)]
#[error("Could not invoke function \"{name}\": function does not exist or is not callable")]
pub struct FunctionNotFound {
    /// The offending function name
    pub name: String,
    /// Registered names that look similar, closest first
    pub suggestions: Vec<String>,
}

/// The template body raised an error while executing.
///
/// The original error is kept untouched; use [`EvaluationError::find`] to get
/// at a specific error type anywhere in its source chain.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct EvaluationError(#[from] anyhow::Error);

impl EvaluationError {
    /// Wrap any error raised by a body.
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self(anyhow::Error::new(error))
    }

    /// Create an evaluation error from a plain message.
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self(anyhow::Error::msg(message))
    }

    /// Find the first error of type `E` in the source chain.
    ///
    /// Errors carried through a foreign chain as [`Forwarded`] are matched as
    /// the error they wrap.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.0.chain().find_map(|cause| match cause.downcast_ref::<Forwarded>() {
            Some(forwarded) => forwarded.get::<E>(),
            None => cause.downcast_ref::<E>(),
        })
    }

    /// Borrow the underlying error.
    pub fn inner(&self) -> &anyhow::Error {
        &self.0
    }

    /// Unwrap into the underlying error.
    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

/// An [`anyhow::Error`] carried inside another library's error chain.
///
/// Boxing an `anyhow::Error` directly hides the type of the error it holds.
/// `Forwarded` displays as the wrapped error, continues the chain with its
/// causes, and lets [`EvaluationError::find`] downcast to the wrapped error.
#[derive(Debug)]
pub struct Forwarded(anyhow::Error);

impl Forwarded {
    pub fn new(error: anyhow::Error) -> Self {
        Self(error)
    }

    fn get<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        let inner: &(dyn std::error::Error + Send + Sync + 'static) = &*self.0;
        inner.downcast_ref::<E>()
    }
}

impl std::fmt::Display for Forwarded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for Forwarded {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Failure to turn a location into an evaluator or a template.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Nothing is known under this location.
    #[error("No template body registered at '{location}'")]
    UnknownLocation {
        /// The requested location
        location: String,
    },

    /// The location cannot be used to locate a template body.
    #[error("Invalid template location '{location}': {reason}")]
    InvalidLocation {
        /// The requested location
        location: String,
        /// Why it was rejected
        reason: String,
    },
}

/// The top-level failure returned by [`Template::render`].
#[derive(Debug, Error)]
pub enum RenderError {
    /// The bindings could not be assembled; no body code ran.
    #[error("Could not retrieve template bindings")]
    Setup {
        /// The template that failed
        template: Template,
        /// Why the bindings could not be built
        #[source]
        source: ContextError,
    },

    /// The body failed during evaluation. Partial output has been discarded.
    #[error("Could not render template")]
    Evaluation {
        /// The template that failed
        template: Template,
        /// The context the template was rendered with
        context: Context,
        /// The error raised by the body
        #[source]
        source: EvaluationError,
    },
}

impl RenderError {
    /// The template that failed.
    pub fn template(&self) -> &Template {
        match self {
            RenderError::Setup {
                template,
                ..
            }
            | RenderError::Evaluation {
                template,
                ..
            } => template,
        }
    }

    /// The context of a failed evaluation. Setup failures carry none.
    pub fn context(&self) -> Option<&Context> {
        match self {
            RenderError::Setup {
                ..
            } => None,
            RenderError::Evaluation {
                context,
                ..
            } => Some(context),
        }
    }

    /// The top-level message, without causes.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Find the first error of type `E` among the causes of this failure.
    pub fn find<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        let mut current: Option<&(dyn std::error::Error + 'static)> =
            std::error::Error::source(self);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            if let Some(eval) = err.downcast_ref::<EvaluationError>() {
                return eval.find::<E>();
            }
            current = err.source();
        }
        None
    }

    /// Generate a user-friendly report with the template, context and causes.
    pub fn format_with_context(&self) -> String {
        let mut msg = String::new();

        msg.push_str("ERROR: Template Render Failed\n\n");
        let _ = writeln!(msg, "Template: {}", self.template().display_name());
        if let Some(location) = self.template().location() {
            let _ = writeln!(msg, "Location: {}", location.display());
        }

        match self.context() {
            Some(context) => {
                let keys = context.known_keys();
                match keys {
                    Some(keys) if keys.is_empty() => msg.push_str("Context: (empty)\n"),
                    Some(keys) => {
                        let _ = writeln!(msg, "Context keys: {}", keys.join(", "));
                    }
                    None => {
                        let _ = writeln!(msg, "Context: {}", context.kind());
                    }
                }
            }
            None => msg.push_str("Context: (not evaluated)\n"),
        }

        let _ = write!(msg, "\n{}\n", self);
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            let _ = writeln!(msg, "  → {}", cause);
            current = cause.source();
        }

        if let Some(missing) = self.find::<FunctionNotFound>() {
            if missing.suggestions.is_empty() {
                let names = self.template().functions().names();
                if !names.is_empty() {
                    let _ = write!(msg, "\nAvailable functions: {}\n", names.join(", "));
                }
            } else {
                let _ = write!(msg, "\nDid you mean: {}?\n", missing.suggestions.join(", "));
            }
        }

        msg
    }
}
