//! Schema and directory setup.

use cloudstore::AppContext;
use cloudstore_core::config::AppConfig;
use cloudstore_core::error::AppError;

use crate::output;

/// Run migrations and create the storage root and archive directory.
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    let ctx = AppContext::build(config).await?;
    ctx.db.health_check().await?;
    output::print_success("All migrations applied successfully.");
    output::print_kv("storage root", &ctx.config.storage.root_path);
    output::print_kv("archive dir", &ctx.config.storage.tmp_dir);
    ctx.db.close().await;
    Ok(())
}
