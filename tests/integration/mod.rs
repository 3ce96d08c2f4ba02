//! Integration test suite for isotemplate
//!
//! End-to-end tests for template files on disk and for the `isotemplate`
//! binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **templating**: tera template files rendered through `TemplateFactory`
//! - **config**: configuration file discovery and defaults
//! - **cli**: the `render` and `functions` commands

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod config;
mod templating;
