//! Storage and quota configuration.

use serde::{Deserialize, Serialize};

/// Physical storage configuration.
///
/// The storage root is threaded explicitly into the path resolver and the
/// local provider at construction; nothing reads it from process state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory under which every owner root lives.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Directory for temporary download archives.
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,
    /// Total capacity the service may hand out, in bytes.
    #[serde(default = "default_total_capacity")]
    pub total_capacity_bytes: u64,
    /// Largest share of the total capacity a single tenant may claim.
    #[serde(default = "default_tenant_share")]
    pub tenant_share_percent: u8,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            tmp_dir: default_tmp_dir(),
            total_capacity_bytes: default_total_capacity(),
            tenant_share_percent: default_tenant_share(),
        }
    }
}

impl StorageConfig {
    /// Largest capacity, in bytes, any single tenant may be granted.
    pub fn tenant_cap_bytes(&self) -> u64 {
        let share = u64::from(self.tenant_share_percent.min(100));
        self.total_capacity_bytes / 100 * share
            + self.total_capacity_bytes % 100 * share / 100
    }
}

fn default_root_path() -> String {
    "./data/storage".to_string()
}

fn default_tmp_dir() -> String {
    "./data/tmp".to_string()
}

fn default_total_capacity() -> u64 {
    1_099_511_627_776 // 1 TiB
}

fn default_tenant_share() -> u8 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_cap_is_half_by_default() {
        let config = StorageConfig {
            total_capacity_bytes: 1_000,
            ..StorageConfig::default()
        };
        assert_eq!(config.tenant_cap_bytes(), 500);
    }

    #[test]
    fn test_tenant_cap_does_not_overflow() {
        let config = StorageConfig {
            total_capacity_bytes: u64::MAX,
            tenant_share_percent: 100,
            ..StorageConfig::default()
        };
        assert_eq!(config.tenant_cap_bytes(), u64::MAX);
    }
}
