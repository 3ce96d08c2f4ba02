//! The capabilities handed to a template body.
//!
//! A body sees exactly two bindings and nothing else:
//!
//! - `c(key, default)` reads a value from the render context
//! - `f(name, args...)` invokes a registered template function
//!
//! Both are opaque closures. They are `'static`, `Send` and `Sync`, so an
//! evaluator may hand them to any engine it embeds.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::error::ContextError;

/// Name of the context-accessor binding.
pub const CONTEXT_BINDING: &str = "c";

/// Name of the function-dispatcher binding.
pub const FUNCTION_BINDING: &str = "f";

/// `c(key, default)`: resolves a key against the render context.
pub type ContextAccessor =
    Arc<dyn Fn(&str, Option<Value>) -> Result<Value, ContextError> + Send + Sync>;

/// `f(name, args)`: invokes a template function by name.
pub type FunctionDispatcher = Arc<dyn Fn(&str, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// The bindings passed into one evaluation.
#[derive(Clone)]
pub struct Bindings {
    context: ContextAccessor,
    functions: FunctionDispatcher,
}

impl Bindings {
    /// Assemble bindings from the two capabilities.
    pub fn new(context: ContextAccessor, functions: FunctionDispatcher) -> Self {
        Self {
            context,
            functions,
        }
    }

    /// The binding names, in a stable order.
    pub const fn names() -> [&'static str; 2] {
        [CONTEXT_BINDING, FUNCTION_BINDING]
    }

    /// Read `key` from the context; `null` if it is found nowhere.
    pub fn c(&self, key: &str) -> Result<Value, ContextError> {
        (self.context)(key, None)
    }

    /// Read `key` from the context, with an explicit default.
    pub fn c_or(&self, key: &str, default: impl Into<Value>) -> Result<Value, ContextError> {
        (self.context)(key, Some(default.into()))
    }

    /// Invoke the template function `name` with `args`.
    pub fn f(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        (self.functions)(name, args)
    }

    /// The raw context accessor.
    pub fn context_accessor(&self) -> &ContextAccessor {
        &self.context
    }

    /// The raw function dispatcher.
    pub fn function_dispatcher(&self) -> &FunctionDispatcher {
        &self.functions
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings").field("names", &Self::names()).finish_non_exhaustive()
    }
}

/// Render a value the way bodies print it: strings verbatim, `null` as
/// nothing, everything else as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Short description of a value's JSON type, for error messages.
pub(crate) fn describe_value(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
