//! Administrator bootstrap.

use clap::Args;

use cloudstore::AppContext;
use cloudstore_core::config::AppConfig;
use cloudstore_core::error::AppError;
use cloudstore_service::NewUser;

use crate::output::{self, OutputFormat, UserRow};

/// Arguments for the bootstrap-admin command
#[derive(Debug, Args)]
pub struct BootstrapArgs {
    /// Email (will prompt if not provided)
    #[arg(short, long)]
    pub email: Option<String>,
    /// Display name (will prompt if not provided)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Granted capacity in bytes
    #[arg(short, long, default_value_t = 1_073_741_824)]
    pub storage_size: i64,
}

/// Create the first administrator if none exists.
pub async fn execute(
    args: &BootstrapArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let email = match &args.email {
        Some(e) => e.clone(),
        None => prompt("Admin email")?,
    };
    let name = match &args.name {
        Some(n) => n.clone(),
        None => prompt("Admin name")?,
    };

    let ctx = AppContext::build(config).await?;
    let user = ctx
        .users
        .bootstrap_admin(NewUser {
            email,
            name,
            is_admin: true,
            storage_size: args.storage_size,
        })
        .await?;

    output::print_success(&format!("Administrator '{}' created (id: {})", user.name, user.id));
    output::print_rows(&[UserRow::from(&user)], format);
    Ok(())
}

fn prompt(label: &str) -> Result<String, AppError> {
    dialoguer::Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
