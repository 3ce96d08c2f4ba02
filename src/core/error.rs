//! Error handling for isotemplate.
//!
//! Library code returns precise error types ([`IsotemplateError`] here,
//! [`RenderError`] and friends in [`crate::templating::error`]). At the
//! command-line boundary everything is funnelled through
//! [`user_friendly_error`], which recognises the known types anywhere in the
//! error chain and attaches an actionable suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use isotemplate::core::{IsotemplateError, user_friendly_error};
//!
//! let error = anyhow::Error::from(IsotemplateError::ConfigNotFound {
//!     path: "/etc/isotemplate.toml".to_string(),
//! });
//! let ctx = user_friendly_error(error);
//! ctx.display(); // prints "error: ...", "details: ...", "suggestion: ..."
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::templating::{ContextError, FactoryError, FunctionNotFound, RenderError};

/// Failures of the configuration and command layers.
#[derive(Error, Debug, Clone)]
pub enum IsotemplateError {
    /// A configuration file was named explicitly but does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up
        path: String,
    },

    /// The configuration file is not valid TOML for the engine settings
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A data file has an extension that maps to no known format
    #[error("Unsupported data file format: {path}")]
    UnsupportedDataFormat {
        /// The offending file
        path: String,
    },

    /// Context data was readable but is not a key/value mapping
    #[error("Invalid context from {origin}: {reason}")]
    InvalidContext {
        /// Where the context came from (file path or `--set`)
        origin: String,
        /// What was wrong with it
        reason: String,
    },

    /// A `--set` argument is not of the form `key=value`
    #[error("Invalid assignment '{assignment}': expected key=value")]
    InvalidAssignment {
        /// The argument as given
        assignment: String,
    },

    /// The template file does not exist
    #[error("Template not found: {path}")]
    TemplateNotFound {
        /// Path that was looked up
        path: String,
    },

    /// A template failed to render
    #[error("Failed to render template '{template}'")]
    RenderFailed {
        /// Display name of the template
        template: String,
    },

    /// File system operation failed
    #[error("File system error: {operation}")]
    FileSystemError {
        /// What was being done
        operation: String,
        /// Path involved
        path: String,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// What was being done
        operation: String,
        /// Path involved
        path: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

/// An error together with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: IsotemplateError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: IsotemplateError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colour.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Message prefix used by [`crate::config::parse_config`].
const CONFIG_PARSE_PREFIX: &str = "Failed to parse config file: ";

/// Convert any error into an [`ErrorContext`] suitable for the terminal.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(render_error) = error.chain().find_map(|e| e.downcast_ref::<RenderError>()) {
        return render_error_context(render_error);
    }

    if let Some(iso_error) = error.downcast_ref::<IsotemplateError>() {
        return create_error_context(iso_error.clone());
    }

    if let Some(factory_error) = error.downcast_ref::<FactoryError>() {
        return ErrorContext::new(IsotemplateError::Other {
            message: factory_error.to_string(),
        })
        .with_suggestion("Check the template path and the configured template_dir");
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(IsotemplateError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check file ownership and permissions")
                .with_details(chain_message(&error));
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(IsotemplateError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(chain_message(&error));
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.chain().find_map(|e| e.downcast_ref::<toml::de::Error>()) {
        let message = error.to_string();
        if let Some(file) = message.strip_prefix(CONFIG_PARSE_PREFIX) {
            return ErrorContext::new(IsotemplateError::ConfigParseError {
                file: file.to_string(),
                reason: toml_error.to_string(),
            })
            .with_suggestion(
                "Check the TOML syntax. Recognised keys are template_dir, builtins and a [defaults] table",
            )
            .with_details(toml_error.to_string());
        }
    }

    ErrorContext::new(IsotemplateError::Other {
        message: chain_message(&error),
    })
}

/// The error message followed by a numbered list of its causes.
fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    message
}

fn render_error_context(error: &RenderError) -> ErrorContext {
    let ctx = ErrorContext::new(IsotemplateError::RenderFailed {
        template: error.template().display_name(),
    })
    .with_details(error.format_with_context().trim_end().to_string());

    if error.find::<FunctionNotFound>().is_some() {
        return ctx.with_suggestion(
            "Call one of the available functions, or register the missing one. \
             Run 'isotemplate functions' to list them",
        );
    }

    if matches!(
        error.find::<ContextError>(),
        Some(ContextError::InvalidShape {
            ..
        })
    ) {
        return ctx.with_suggestion("Pass the context as a key/value mapping");
    }

    ctx.with_suggestion(
        "Check template syntax: values are read with c(key=\"...\") and functions called with \
         f(name=\"...\", args=[...]); no other variables or functions are available",
    )
}

fn create_error_context(error: IsotemplateError) -> ErrorContext {
    match &error {
        IsotemplateError::ConfigNotFound {
            path,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Create {path}, or unset ISOTEMPLATE_CONFIG / drop --config to use the defaults"
            ))
            .with_details("A configuration file named explicitly must exist"),

        IsotemplateError::UnsupportedDataFormat {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Use a .json, .toml, .yaml or .yml file"),

        IsotemplateError::InvalidContext {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("The top level of a context file must be a table/object of keys"),

        IsotemplateError::InvalidAssignment {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Use --set key=value, e.g. --set name=alice or --set 'tags=[\"a\"]'"),

        IsotemplateError::TemplateNotFound {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Check the template path and the configured template_dir"),

        _ => ErrorContext::new(error),
    }
}
