//! CLI command definitions and dispatch.

pub mod config;
pub mod run;
pub mod validate;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use hookline_core::config::AppConfig;
use hookline_core::error::AppError;

/// Hookline: run ordered lifecycle hooks from pipeline files
#[derive(Debug, Parser)]
#[command(name = "hookline", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a pipeline and print the resulting store
    Run(run::RunArgs),
    /// Check a pipeline file without running it
    Validate(validate::ValidateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Run(args) => run::execute(args, config, self.format).await,
            Commands::Validate(args) => validate::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.format).await,
        }
    }
}
