//! Capability-based access policy.
//!
//! A policy is a closed set of rules evaluated by one pure function over
//! the caller's capability flags.

use cloudstore_core::error::AppError;

/// What the caller can prove about itself for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The caller presented a login credential.
    pub authenticated: bool,
    /// The caller is an administrator.
    pub is_admin: bool,
    /// The caller owns the targeted tree.
    pub is_owner: bool,
}

/// Rules gating service entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any authenticated caller.
    Authenticated,
    /// Authenticated administrators only.
    AdminOnly,
    /// Authenticated, and either an administrator or a non-admin owner.
    OwnerOrAdmin,
}

/// Evaluate `policy` against `caps`.
pub fn can_perform(policy: AccessPolicy, caps: &Capabilities) -> bool {
    match policy {
        AccessPolicy::Authenticated => caps.authenticated,
        AccessPolicy::AdminOnly => caps.authenticated && caps.is_admin,
        AccessPolicy::OwnerOrAdmin => {
            caps.authenticated && (caps.is_admin || (!caps.is_admin && caps.is_owner))
        }
    }
}

/// Fail with `PermissionDenied` unless `policy` admits `caps`.
///
/// The message never mentions the target, so a denial does not reveal
/// whether it exists.
pub fn require(policy: AccessPolicy, caps: &Capabilities) -> Result<(), AppError> {
    if can_perform(policy, caps) {
        Ok(())
    } else {
        Err(AppError::permission_denied("Permission denied"))
    }
}
