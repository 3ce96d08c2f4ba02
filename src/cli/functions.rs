//! The `functions` command.

use anyhow::Result;
use clap::Args;

use crate::config::EngineConfig;

/// List the functions available to templates.
#[derive(Args, Debug)]
pub struct FunctionsCommand {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// How the function list is printed.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One name per line
    Text,
    /// A JSON array of names
    Json,
}

impl FunctionsCommand {
    pub fn execute(&self, engine: &EngineConfig) -> Result<()> {
        let names = engine.functions().names();

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            OutputFormat::Text if names.is_empty() => println!("No functions registered"),
            OutputFormat::Text => {
                for name in names {
                    println!("{name}");
                }
            }
        }

        Ok(())
    }
}
