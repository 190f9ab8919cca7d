//! Storage teardown.

use std::path::Path;

use clap::Args;
use tracing::info;

use cloudstore_core::config::AppConfig;
use cloudstore_core::error::{AppError, ErrorKind};

use crate::output;

/// Arguments for the clean command
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Skip confirmation prompt
    #[arg(long)]
    pub force: bool,
}

/// Remove every owner root and archive. The database is left untouched.
pub async fn execute(args: &CleanArgs, config: AppConfig) -> Result<(), AppError> {
    if !args.force {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!(
                "This will DELETE everything under '{}' and '{}'. Continue?",
                config.storage.root_path, config.storage.tmp_dir
            ))
            .default(false)
            .interact()
            .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

        if !confirm {
            println!("Cancelled.");
            return Ok(());
        }
    }

    for dir in [&config.storage.root_path, &config.storage.tmp_dir] {
        remove_tree(Path::new(dir)).await?;
        info!(path = %dir, "Removed");
    }

    output::print_success("Storage cleaned.");
    Ok(())
}

async fn remove_tree(path: &Path) -> Result<(), AppError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::with_source(
            ErrorKind::StoreFailure,
            format!("Failed to remove {}", path.display()),
            e,
        )),
    }
}
