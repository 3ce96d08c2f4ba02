//! Render contexts and the resolution protocol.
//!
//! A render call is given a context from which the template reads named values
//! through its `c` binding. Three shapes of context are accepted:
//!
//! - a plain key/value mapping ([`Context::Map`]),
//! - an object that can be indexed with an existence check ([`Indexable`]),
//! - a lookup service exposing `has` / `get` ([`ContextService`]).
//!
//! Omitting the context ([`Context::Empty`]) makes every lookup fall through to
//! the template's defaults.
//!
//! # Resolution Order
//!
//! [`resolve`] always applies the same precedence:
//!
//! 1. The context value, if the context has the key
//! 2. The default-context value, if the defaults have the key
//! 3. The caller-supplied fallback, or `null` when none was given
//!
//! Lookup services are consulted through their own `has` before anything else,
//! so services that compute keys lazily keep their semantics.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::bindings::describe_value;
use super::error::ContextError;

/// An object that can be indexed by key with an existence check.
pub trait Indexable: Send + Sync {
    /// Whether a value exists at `key`.
    fn contains_key(&self, key: &str) -> bool;

    /// The value at `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Keys known up front, used only for diagnostics.
    fn keys(&self) -> Option<Vec<String>> {
        None
    }
}

/// A capability-based lookup service.
///
/// `get` is only called after `has` returned `true` for the same key.
pub trait ContextService: Send + Sync {
    /// Whether the service can produce a value for `key`.
    fn has(&self, key: &str) -> bool;

    /// Produce the value for `key`.
    fn get(&self, key: &str) -> anyhow::Result<Value>;
}

impl Indexable for HashMap<String, Value> {
    fn contains_key(&self, key: &str) -> bool {
        HashMap::contains_key(self, key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        HashMap::get(self, key).cloned()
    }

    fn keys(&self) -> Option<Vec<String>> {
        let mut keys: Vec<String> = HashMap::keys(self).cloned().collect();
        keys.sort();
        Some(keys)
    }
}

impl Indexable for BTreeMap<String, Value> {
    fn contains_key(&self, key: &str) -> bool {
        BTreeMap::contains_key(self, key)
    }

    fn get(&self, key: &str) -> Option<Value> {
        BTreeMap::get(self, key).cloned()
    }

    fn keys(&self) -> Option<Vec<String>> {
        Some(BTreeMap::keys(self).cloned().collect())
    }
}

/// The per-call data source a template reads from.
///
/// Cloning is cheap: every shape is held behind an [`Arc`]. The engine never
/// writes into a context.
#[derive(Clone, Default)]
pub enum Context {
    /// No context supplied; all lookups fall through to the defaults.
    #[default]
    Empty,
    /// A plain key/value mapping.
    Map(Arc<Map<String, Value>>),
    /// An indexable object.
    Indexable(Arc<dyn Indexable>),
    /// A lookup service with `has` / `get`.
    Service(Arc<dyn ContextService>),
}

impl Context {
    /// Create a context from a key/value mapping.
    pub fn map(map: Map<String, Value>) -> Self {
        Context::Map(Arc::new(map))
    }

    /// Create a context from an indexable object.
    pub fn indexable(value: impl Indexable + 'static) -> Self {
        Context::Indexable(Arc::new(value))
    }

    /// Create a context from a lookup service.
    pub fn service(service: impl ContextService + 'static) -> Self {
        Context::Service(Arc::new(service))
    }

    /// Short name of the shape, for logs and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Context::Empty => "empty",
            Context::Map(_) => "map",
            Context::Indexable(_) => "indexable",
            Context::Service(_) => "service",
        }
    }

    /// Keys known without querying, if the shape can enumerate them.
    ///
    /// Lookup services cannot be enumerated and return `None`.
    pub fn known_keys(&self) -> Option<Vec<String>> {
        match self {
            Context::Empty => Some(Vec::new()),
            Context::Map(map) => Some(map.keys().cloned().collect()),
            Context::Indexable(indexable) => indexable.keys(),
            Context::Service(_) => None,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Context::Empty => f.write_str("Context::Empty"),
            Context::Map(map) => f.debug_tuple("Context::Map").field(map).finish(),
            Context::Indexable(indexable) => f
                .debug_struct("Context::Indexable")
                .field("keys", &indexable.keys())
                .finish(),
            Context::Service(_) => f.write_str("Context::Service(..)"),
        }
    }
}

/// Conversion of render-call input into a validated [`Context`].
///
/// This is where the context shape is checked: anything that is not one of
/// the accepted shapes is rejected with [`ContextError::InvalidShape`] before
/// any template code runs.
pub trait IntoContext {
    /// Convert into a context, validating the shape.
    fn into_context(self) -> Result<Context, ContextError>;
}

impl IntoContext for Context {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(self)
    }
}

impl IntoContext for &Context {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(self.clone())
    }
}

impl IntoContext for () {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(Context::Empty)
    }
}

impl<T: IntoContext> IntoContext for Option<T> {
    fn into_context(self) -> Result<Context, ContextError> {
        match self {
            Some(inner) => inner.into_context(),
            None => Ok(Context::Empty),
        }
    }
}

impl IntoContext for Map<String, Value> {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(Context::map(self))
    }
}

impl IntoContext for HashMap<String, Value> {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(Context::indexable(self))
    }
}

impl IntoContext for BTreeMap<String, Value> {
    fn into_context(self) -> Result<Context, ContextError> {
        Ok(Context::indexable(self))
    }
}

impl IntoContext for Value {
    fn into_context(self) -> Result<Context, ContextError> {
        match self {
            Value::Object(map) => Ok(Context::map(map)),
            Value::Null => Ok(Context::Empty),
            other => Err(ContextError::InvalidShape {
                found: describe_value(&other).to_string(),
            }),
        }
    }
}

impl IntoContext for &Value {
    fn into_context(self) -> Result<Context, ContextError> {
        self.clone().into_context()
    }
}

/// Resolve `key` against a context, falling back to `defaults` and then to
/// `fallback`.
///
/// This is a pure function of its inputs. A missing `fallback` resolves to
/// `null`.
///
/// # Errors
///
/// Returns [`ContextError::Lookup`] when a lookup service reports the key as
/// present but then fails to produce it.
pub fn resolve(
    context: &Context,
    key: &str,
    fallback: Option<Value>,
    defaults: &Map<String, Value>,
) -> Result<Value, ContextError> {
    let found = match context {
        Context::Service(service) => {
            if service.has(key) {
                let value = service.get(key).map_err(|source| ContextError::Lookup {
                    key: key.to_string(),
                    source,
                })?;
                Some(value)
            } else {
                None
            }
        }
        Context::Indexable(indexable) => {
            if indexable.contains_key(key) {
                Some(indexable.get(key).unwrap_or(Value::Null))
            } else {
                None
            }
        }
        Context::Map(map) => map.get(key).cloned(),
        Context::Empty => None,
    };

    if let Some(value) = found {
        tracing::trace!("Resolved '{}' from {} context", key, context.kind());
        return Ok(value);
    }

    if let Some(value) = defaults.get(key) {
        tracing::trace!("Resolved '{}' from default context", key);
        return Ok(value.clone());
    }

    tracing::trace!("Key '{}' not found, using fallback", key);
    Ok(fallback.unwrap_or(Value::Null))
}
