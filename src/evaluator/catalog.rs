//! Closure bodies registered under a location.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::factory::EvaluatorFactory;
use super::{Body, Evaluator};
use crate::templating::bindings::Bindings;
use crate::templating::error::{EvaluationError, FactoryError};

/// A shared registry of closure bodies keyed by location.
///
/// Clones share the same storage. Evaluators produced from a catalog look
/// their body up again on every evaluation, so replacing a body takes effect
/// for templates that already exist.
#[derive(Clone, Default)]
pub struct BodyCatalog {
    bodies: Arc<RwLock<HashMap<PathBuf, Body>>>,
}

impl BodyCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` at `location`, replacing any previous body.
    pub fn insert<F>(&self, location: impl Into<PathBuf>, body: F)
    where
        F: Fn(&Bindings) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let location = location.into();
        tracing::debug!("Registering template body at '{}'", location.display());
        self.bodies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(location, Arc::new(body));
    }

    /// Remove the body at `location`. Returns whether one was registered.
    pub fn remove(&self, location: &Path) -> bool {
        self.bodies.write().unwrap_or_else(PoisonError::into_inner).remove(location).is_some()
    }

    pub fn contains(&self, location: &Path) -> bool {
        self.bodies.read().unwrap_or_else(PoisonError::into_inner).contains_key(location)
    }

    fn lookup(&self, location: &Path) -> Option<Body> {
        self.bodies.read().unwrap_or_else(PoisonError::into_inner).get(location).cloned()
    }
}

impl fmt::Debug for BodyCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bodies = self.bodies.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_set().entries(bodies.keys()).finish()
    }
}

impl EvaluatorFactory for BodyCatalog {
    fn from_location(&self, location: &Path) -> Result<Box<dyn Evaluator>, FactoryError> {
        if !self.contains(location) {
            return Err(FactoryError::UnknownLocation {
                location: location.display().to_string(),
            });
        }
        Ok(Box::new(CatalogEvaluator {
            catalog: self.clone(),
            location: location.to_path_buf(),
        }))
    }
}

/// Evaluates whatever body a [`BodyCatalog`] holds at one location.
#[derive(Debug, Clone)]
pub struct CatalogEvaluator {
    catalog: BodyCatalog,
    location: PathBuf,
}

impl Evaluator for CatalogEvaluator {
    fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvaluationError> {
        let body = self.catalog.lookup(&self.location).ok_or_else(|| {
            EvaluationError::new(FactoryError::UnknownLocation {
                location: self.location.display().to_string(),
            })
        })?;
        tracing::trace!("Evaluating catalog body '{}'", self.location.display());
        body(bindings).map_err(EvaluationError::from)
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.location)
    }
}
