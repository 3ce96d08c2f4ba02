//! isotemplate - isolated template rendering
//!
//! A template is a body of code plus a default context and a set of named
//! functions. Rendering runs the body with exactly two capabilities in scope:
//!
//! - `c(key, default)` reads a value from the render context, falling back to
//!   the template's default context and then to `default`
//! - `f(name, args...)` calls a registered function
//!
//! Everything the body writes while it runs is captured and returned as the
//! rendered text. A body that fails produces an error and no text at all.
//!
//! # Modules
//!
//! - [`templating`] - templates, contexts, functions, output capture, errors
//! - [`evaluator`] - how template bodies are executed (closures, tera files)
//!   and the factories that create templates from locations
//! - [`config`] - engine configuration and data file parsing
//! - [`core`] - application errors and user-facing error reports
//! - [`cli`] - the `isotemplate` command-line interface
//!
//! # Example
//!
//! ```
//! use isotemplate::echo;
//! use isotemplate::evaluator::FnEvaluator;
//! use isotemplate::templating::Template;
//! use isotemplate::templating::builtins::builtin_registry;
//! use serde_json::{Value, json};
//!
//! let body = FnEvaluator::new(|b| {
//!     let name = b.c_or("name", "world")?;
//!     echo!("Hello, {}!", b.f("upper", &[name])?.as_str().unwrap_or_default());
//!     Ok(Value::Null)
//! });
//!
//! let template = Template::builder(body).functions(builtin_registry()).build();
//!
//! assert_eq!(template.render(()).unwrap(), "Hello, WORLD!");
//! assert_eq!(template.render(json!({"name": "ada"})).unwrap(), "Hello, ADA!");
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod evaluator;
pub mod templating;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
