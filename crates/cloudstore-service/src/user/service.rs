//! Tenant provisioning, removal and usage reporting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use cloudstore_auth::policy::AccessPolicy;
use cloudstore_core::error::{AppError, ErrorKind};
use cloudstore_core::result::AppResult;
use cloudstore_core::traits::PhysicalStore;
use cloudstore_database::repositories::{DataRepository, UserRepository};
use cloudstore_entity::data::is_valid_name;
use cloudstore_entity::user::{CreateUser, User, UserUsage};
use cloudstore_storage::QuotaGuard;

use crate::access::AccessGuard;
use crate::context::Identity;
use crate::resolver::PathResolver;

/// Request to provision a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Email address; the login subject.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Whether the user is an administrator.
    #[serde(default)]
    pub is_admin: bool,
    /// Requested capacity in bytes.
    pub storage_size: i64,
}

/// Manages tenants and their owner roots.
#[derive(Debug, Clone)]
pub struct UserService {
    access: Arc<AccessGuard>,
    user_repo: Arc<UserRepository>,
    data_repo: Arc<DataRepository>,
    resolver: Arc<PathResolver>,
    store: Arc<dyn PhysicalStore>,
    quota: QuotaGuard,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        access: Arc<AccessGuard>,
        user_repo: Arc<UserRepository>,
        data_repo: Arc<DataRepository>,
        resolver: Arc<PathResolver>,
        store: Arc<dyn PhysicalStore>,
        quota: QuotaGuard,
    ) -> Self {
        Self {
            access,
            user_repo,
            data_repo,
            resolver,
            store,
            quota,
        }
    }

    /// Provision a user. Administrators only.
    pub async fn create_user(&self, identity: &Identity, req: NewUser) -> AppResult<User> {
        let operator = self
            .access
            .authorize(identity, AccessPolicy::AdminOnly, None)
            .await?;
        let user = self.provision(req).await?;
        info!(operator_id = operator.id, user_id = user.id, "User created");
        Ok(user)
    }

    /// Create the first administrator. Fails if one already exists.
    pub async fn bootstrap_admin(&self, mut req: NewUser) -> AppResult<User> {
        if self.user_repo.has_admin().await? {
            return Err(AppError::already_exists("An administrator already exists"));
        }
        req.is_admin = true;
        let user = self.provision(req).await?;
        info!(user_id = user.id, email = %user.email, "Administrator bootstrapped");
        Ok(user)
    }

    async fn provision(&self, req: NewUser) -> AppResult<User> {
        validate_email(&req.email)?;
        if !is_valid_name(&req.name) {
            return Err(AppError::invalid_name(format!("Invalid user name: {:?}", req.name)));
        }
        self.quota.check_capacity(req.storage_size, None)?;

        let user = self
            .user_repo
            .create(&CreateUser {
                email: req.email,
                name: req.name,
                is_admin: req.is_admin,
                storage_size: req.storage_size,
            })
            .await?;

        let root = self.resolver.owner_root(user.id);
        if let Err(cause) = self.store.create_dir(&root).await {
            return Err(match self.user_repo.delete(user.id).await {
                Ok(_) => {
                    warn!(user_id = user.id, error = %cause, "User creation rolled back");
                    cause
                }
                Err(rollback) => {
                    error!(
                        user_id = user.id,
                        error = %cause,
                        rollback_error = %rollback,
                        "User rollback failed"
                    );
                    AppError::with_source(
                        ErrorKind::StoreFailure,
                        format!("Failed to remove user {} after '{}'", user.id, cause.message),
                        rollback,
                    )
                }
            });
        }

        Ok(user)
    }

    /// Remove a non-admin user with all their records and files.
    pub async fn remove_user(&self, identity: &Identity, user_id: i64) -> AppResult<()> {
        let operator = self
            .access
            .authorize(identity, AccessPolicy::AdminOnly, None)
            .await?;
        let target = self.access.require_user(user_id).await?;
        if target.is_admin() {
            return Err(AppError::permission_denied("Administrators cannot be removed"));
        }

        self.user_repo.delete(user_id).await?;
        let dir = self.resolver.owner_dir(user_id);
        if let Err(e) = self.store.remove(&dir).await {
            warn!(user_id, path = %dir.display(), error = %e, "Owner directory left behind");
        }

        info!(operator_id = operator.id, user_id, "User removed");
        Ok(())
    }

    /// Look up a user by email or fail with `UserNotFound`.
    pub async fn find_by_email(&self, email: &str) -> AppResult<User> {
        self.user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::user_not_found(format!("User '{email}' not found")))
    }

    /// Bytes used against bytes granted.
    pub async fn usage(&self, identity: &Identity, user_id: i64) -> AppResult<UserUsage> {
        let user = self.access.authorize_owner(identity, user_id).await?;
        let used_bytes = self.data_repo.owner_usage(user_id).await?;
        Ok(UserUsage {
            used_bytes,
            storage_size: user.storage_size,
        })
    }
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_name(format!("Invalid email: {email:?}")))
    }
}
