//! Named functions available to templates.
//!
//! Templates call helper logic through their `f` binding, by name, with a
//! variable list of arguments. The [`FunctionRegistry`] maps those names to
//! callables and is read-only once a [`Template`](super::Template) owns it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use strsim::levenshtein;

use super::error::FunctionNotFound;

/// Maximum allowed Levenshtein distance as a percentage of the requested name
/// length for a registered name to be suggested.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// A callable exposed to templates.
pub type TemplateFunction = Arc<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// A name-to-callable mapping.
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, TemplateFunction>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `function` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F) -> &mut Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.register(name, function);
        self
    }

    /// Copy every entry of `other` into this registry. Entries in `other` win.
    pub fn extend(&mut self, other: &FunctionRegistry) {
        for (name, function) in &other.functions {
            self.functions.insert(name.clone(), Arc::clone(function));
        }
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Invoke the function registered under `name` with `args`, in order.
    ///
    /// # Errors
    ///
    /// Fails with [`FunctionNotFound`] when `name` is not registered. Errors
    /// raised by the function itself are returned as-is.
    pub fn invoke(&self, name: &str, args: &[Value]) -> anyhow::Result<Value> {
        let Some(function) = self.functions.get(name) else {
            tracing::debug!("Template function '{}' is not registered", name);
            return Err(FunctionNotFound {
                name: name.to_string(),
                suggestions: self.similar_names(name),
            }
            .into());
        };

        tracing::trace!("Invoking template function '{}' with {} argument(s)", name, args.len());
        function(args)
    }

    /// Up to three registered names close to `target`, closest first.
    fn similar_names(&self, target: &str) -> Vec<String> {
        let mut scored: Vec<_> = self
            .functions
            .keys()
            .map(|name| (name.clone(), levenshtein(target, name)))
            .collect();

        scored.sort_by_key(|(_, dist)| *dist);

        scored
            .into_iter()
            .filter(|(_, dist)| *dist <= target.len() * SIMILARITY_THRESHOLD_PERCENT / 100)
            .take(3)
            .map(|(name, _)| name)
            .collect()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.functions.keys()).finish()
    }
}
