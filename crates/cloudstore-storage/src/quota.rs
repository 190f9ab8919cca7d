//! Tenant capacity enforcement.

use tracing::warn;

use cloudstore_core::config::StorageConfig;
use cloudstore_core::error::AppError;
use cloudstore_core::result::AppResult;

/// Rejects capacity grants above the per-tenant share of the total.
///
/// Nothing is cached: the cap is derived from configuration on every call.
#[derive(Debug, Clone)]
pub struct QuotaGuard {
    config: StorageConfig,
}

impl QuotaGuard {
    /// Create a guard over the given storage configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Largest grant any single tenant may hold, in bytes.
    pub fn tenant_cap_bytes(&self) -> u64 {
        self.config.tenant_cap_bytes()
    }

    /// Allow `requested_bytes` for `owner` or fail with `QuotaExceeded`.
    ///
    /// `owner` is `None` while the tenant is still being provisioned.
    pub fn check_capacity(&self, requested_bytes: i64, owner: Option<i64>) -> AppResult<()> {
        let cap = self.tenant_cap_bytes();
        let within = u64::try_from(requested_bytes).is_ok_and(|bytes| bytes <= cap);
        if within {
            return Ok(());
        }

        warn!(
            owner_id = ?owner,
            requested_bytes,
            cap_bytes = cap,
            "Capacity request rejected"
        );
        Err(AppError::quota_exceeded(format!(
            "Requested {requested_bytes} bytes exceeds the per-user limit of {cap} bytes"
        )))
    }
}

#[cfg(test)]
mod tests {
    use cloudstore_core::error::ErrorKind;

    use super::*;

    fn guard(total: u64) -> QuotaGuard {
        QuotaGuard::new(StorageConfig {
            total_capacity_bytes: total,
            ..StorageConfig::default()
        })
    }

    #[test]
    fn test_half_of_total_is_the_limit() {
        let guard = guard(1_000);
        assert!(guard.check_capacity(500, None).is_ok());
        let err = guard.check_capacity(501, Some(3)).unwrap_err();
        assert!(err.is(ErrorKind::QuotaExceeded));
    }

    #[test]
    fn test_negative_request_rejected() {
        assert!(guard(1_000).check_capacity(-1, None).is_err());
    }
}
