//! Tera-backed template files.
//!
//! A template file is plain text interleaved with tera expressions. The file is
//! read from disk on every evaluation, rendered by a fresh [`Tera`] instance,
//! and the result is written to the ambient output channel.
//!
//! The tera instance is built per evaluation with an empty tera context, so the
//! only external state a file can reach is the two bindings, exposed as tera
//! functions:
//!
//! ```text
//! {% set name = c(key="name", default="world") %}
//! {{ c(key="greeting") }}, {{ f(name="upper", args=[name]) }}!
//! ```
//!
//! `c` takes a required `key` and an optional `default`. `f` takes a required
//! `name` and optional `args`; a non-array `args` is passed as a single
//! argument.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde_json::Value;
use tera::Tera;

use super::Evaluator;
use crate::templating::bindings::{Bindings, CONTEXT_BINDING, FUNCTION_BINDING};
use crate::templating::error::{EvaluationError, Forwarded};
use crate::templating::output;

/// Tera builtins that reach host state and are replaced by failing stubs.
const SHADOWED_BUILTINS: &[&str] = &["get_env", "now", "get_random"];

/// Evaluates a tera template file.
#[derive(Debug, Clone)]
pub struct FileEvaluator {
    path: PathBuf,
}

impl FileEvaluator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn isolated_engine(bindings: &Bindings) -> Tera {
        // Fresh instance per evaluation: nothing leaks between renders.
        let mut tera = Tera::default();

        let context = bindings.context_accessor().clone();
        tera.register_function(
            CONTEXT_BINDING,
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                let key = args
                    .get("key")
                    .and_then(Value::as_str)
                    .ok_or_else(|| tera::Error::msg("`c` requires a string `key` argument"))?;
                context(key, args.get("default").cloned()).map_err(|e| {
                    tera::Error::chain(format!("`c` could not resolve \"{key}\""), e)
                })
            },
        );

        let functions = bindings.function_dispatcher().clone();
        tera.register_function(
            FUNCTION_BINDING,
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                let name = args
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| tera::Error::msg("`f` requires a string `name` argument"))?;
                let call_args = match args.get("args") {
                    None => Vec::new(),
                    Some(Value::Array(items)) => items.clone(),
                    Some(single) => vec![single.clone()],
                };
                functions(name, &call_args).map_err(|e| {
                    let message = format!("`f` could not invoke \"{name}\"");
                    tera::Error::chain(message, Forwarded::new(e))
                })
            },
        );

        for builtin in SHADOWED_BUILTINS {
            let builtin = *builtin;
            tera.register_function(
                builtin,
                move |_: &HashMap<String, Value>| -> tera::Result<Value> {
                    Err(tera::Error::msg(format!("`{builtin}` is not available to templates")))
                },
            );
        }

        tera
    }
}

impl Evaluator for FileEvaluator {
    fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvaluationError> {
        tracing::debug!("Evaluating template file '{}'", self.path.display());

        let source = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read template body: {}", self.path.display()))?;

        let mut tera = Self::isolated_engine(bindings);
        let rendered = tera
            .render_str(&source, &tera::Context::new())
            .with_context(|| format!("Failed to evaluate template body: {}", self.path.display()))?;

        output::write(&rendered);
        Ok(Value::Null)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
