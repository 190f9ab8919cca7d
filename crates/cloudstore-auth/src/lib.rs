//! # cloudstore-auth
//!
//! Credential handling and authorization for CloudStore.
//!
//! ## Modules
//!
//! - `jwt`: login token issuance and verification
//! - `policy`: capability-based access policy evaluation

pub mod jwt;
pub mod policy;

pub use jwt::{Claims, IssueKind, JwtDecoder, JwtEncoder};
pub use policy::{AccessPolicy, Capabilities, can_perform, require};
