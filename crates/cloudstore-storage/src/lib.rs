//! # cloudstore-storage
//!
//! Physical store implementations and the tenant quota guard.

pub mod archive;
pub mod providers;
pub mod quota;

pub use providers::LocalPhysicalStore;
pub use quota::QuotaGuard;
