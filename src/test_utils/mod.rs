//! Test utilities for isotemplate.
//!
//! Helpers shared by unit and integration tests: one-time logging setup,
//! template files in temporary directories, and a context service that
//! counts its lookups.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Map, Value};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::templating::ContextService;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured if present, and logging stays off if not.
///
/// ```bash
/// RUST_LOG=isotemplate=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Write `content` to `dir/name`, creating parent directories.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_template(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create template directory");
    }
    std::fs::write(&path, content).expect("write template file");
    path
}

/// Convert a `json!({...})` literal into a map.
///
/// # Panics
///
/// Panics if `value` is not an object.
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A [`ContextService`] over fixed values that counts its lookups.
#[derive(Debug, Default)]
pub struct CountingService {
    values: HashMap<String, Value>,
    gets: AtomicUsize,
}

impl CountingService {
    pub fn new(values: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            values: values.into_iter().collect(),
            gets: AtomicUsize::new(0),
        }
    }

    /// How many times [`ContextService::get`] was called.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl ContextService for CountingService {
    fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn get(&self, key: &str) -> anyhow::Result<Value> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.values.get(key).cloned().ok_or_else(|| anyhow::anyhow!("no value for '{key}'"))
    }
}
