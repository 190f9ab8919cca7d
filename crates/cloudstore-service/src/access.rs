//! Policy enforcement in front of every service entry point.

use std::sync::Arc;

use tracing::debug;

use cloudstore_auth::policy::{self, AccessPolicy, Capabilities};
use cloudstore_core::error::AppError;
use cloudstore_database::repositories::UserRepository;
use cloudstore_entity::user::User;

use crate::context::Identity;

/// Resolves the calling identity and evaluates an access policy.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    /// User repository.
    user_repo: Arc<UserRepository>,
}

impl AccessGuard {
    /// Creates a new access guard.
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Check `policy` for `identity` acting on `owner_id`'s tree.
    ///
    /// An identity with no matching user is denied like any other caller.
    /// Runs before any lookup of the target so denials reveal nothing.
    pub async fn authorize(
        &self,
        identity: &Identity,
        policy: AccessPolicy,
        owner_id: Option<i64>,
    ) -> Result<User, AppError> {
        let operator = self
            .user_repo
            .find_by_email(&identity.email)
            .await?
            .ok_or_else(|| AppError::permission_denied("Permission denied"))?;

        let caps = Capabilities {
            authenticated: identity.is_authenticated(),
            is_admin: operator.is_admin(),
            is_owner: owner_id == Some(operator.id),
        };

        policy::require(policy, &caps).inspect_err(|_| {
            debug!(
                operator_id = operator.id,
                owner_id = ?owner_id,
                ?policy,
                "Access denied"
            );
        })?;

        Ok(operator)
    }

    /// Load the target user or fail with `UserNotFound`.
    pub async fn require_user(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found(format!("User {user_id} not found")))
    }

    /// Authorize and then load the target owner.
    pub async fn authorize_owner(
        &self,
        identity: &Identity,
        owner_id: i64,
    ) -> Result<User, AppError> {
        self.authorize(identity, AccessPolicy::OwnerOrAdmin, Some(owner_id))
            .await?;
        self.require_user(owner_id).await
    }
}
