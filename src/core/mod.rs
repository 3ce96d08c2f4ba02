//! Core types shared by the library and the command-line interface.
//!
//! - [`IsotemplateError`] enumerates failures outside of rendering itself
//!   (configuration, data files, command arguments)
//! - [`ErrorContext`] pairs an error with a suggestion and details for display
//! - [`user_friendly_error`] turns any [`anyhow::Error`], including
//!   [`RenderError`](crate::templating::RenderError), into an [`ErrorContext`]

pub mod error;

pub use error::{ErrorContext, IsotemplateError, user_friendly_error};
