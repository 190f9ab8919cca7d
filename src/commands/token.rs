//! Login token issuance.

use clap::Args;

use cloudstore::AppContext;
use cloudstore_core::config::AppConfig;
use cloudstore_core::error::AppError;

use crate::output;

/// Arguments for the issue-token command
#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Email of the user to issue for
    #[arg(short, long)]
    pub email: String,
}

/// Print a login token for an existing user.
pub async fn execute(args: &IssueTokenArgs, config: AppConfig) -> Result<(), AppError> {
    let ctx = AppContext::build(config).await?;
    let user = ctx.users.find_by_email(&args.email).await?;
    let (token, expires_at) = ctx.encoder.issue_login(&user.email)?;

    output::print_kv("user id", &user.id.to_string());
    output::print_kv("expires at", &expires_at.to_rfc3339());
    println!("{token}");
    Ok(())
}
