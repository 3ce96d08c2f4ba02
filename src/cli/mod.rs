//! Command-line interface for isotemplate.
//!
//! # Commands
//!
//! - `render <TEMPLATE>`: render a tera template file with a context built
//!   from `--context FILE` and `--set key=value` arguments
//! - `functions`: list the functions templates can call through `f`
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: no logging at all
//! - `--config` / `-c`: engine configuration file (see [`crate::config`])
//!
//! Without either flag the log level is `warn`; `RUST_LOG` overrides the
//! level unless `--quiet` is given. Logs go to stderr so rendered output on
//! stdout stays clean.

mod functions;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;

pub use functions::{FunctionsCommand, OutputFormat};
pub use render::{RenderCommand, parse_assignment};

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log level filter; `None` disables logging
    pub log_level: Option<String>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber for this configuration.
    ///
    /// Safe to call more than once; later calls are no-ops.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Render templates in isolation.
#[derive(Parser, Debug)]
#[command(
    name = "isotemplate",
    about = "Render templates that see only their context and registered functions",
    version,
    long_about = "isotemplate renders tera template files in isolation: a template reads values \
                  through c(key=...) and calls helpers through f(name=..., args=[...]), and \
                  nothing else is in scope."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the engine configuration file
    ///
    /// Overrides the ISOTEMPLATE_CONFIG environment variable and
    /// ~/.isotemplate/config.toml.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a template file
    Render(RenderCommand),

    /// List the available template functions
    Functions(FunctionsCommand),
}

impl Cli {
    /// Run the selected command.
    ///
    /// # Errors
    ///
    /// Returns any configuration, context or render failure.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        config.init_logging();
        self.execute_with_config(config)
    }

    /// Map the global flags to a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an already built configuration.
    ///
    /// # Errors
    ///
    /// Returns any configuration, context or render failure.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let engine = EngineConfig::load(config.config_path.as_deref())?;
        tracing::debug!("Engine configuration: {:?}", engine);

        match self.command {
            Commands::Render(cmd) => cmd.execute(&engine),
            Commands::Functions(cmd) => cmd.execute(&engine),
        }
    }
}
