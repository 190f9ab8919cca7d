//! CLI command definitions and dispatch.

pub mod admin;
pub mod clean;
pub mod migrate;
pub mod token;

use clap::{Parser, Subcommand};

use cloudstore_core::config::AppConfig;
use cloudstore_core::error::AppError;

use crate::output::OutputFormat;

/// CloudStore: multi-tenant file storage
#[derive(Debug, Parser)]
#[command(name = "cloudstore", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to load; falls back to `CLOUDSTORE_ENV`
    #[arg(short, long)]
    pub env: Option<String>,

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
    /// Run migrations and create the storage directories
    Migrate,
    /// Delete the storage root and temporary archives
    Clean(clean::CleanArgs),
    /// Create the first administrator
    BootstrapAdmin(admin::BootstrapArgs),
    /// Issue a login token for an existing user
    IssueToken(token::IssueTokenArgs),
}

impl Cli {
    /// Name of the environment overlay.
    pub fn environment(&self) -> String {
        self.env
            .clone()
            .or_else(|| std::env::var("CLOUDSTORE_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Clean(args) => clean::execute(args, config).await,
            Commands::BootstrapAdmin(args) => admin::execute(args, config, self.format).await,
            Commands::IssueToken(args) => token::execute(args, config).await,
        }
    }
}
