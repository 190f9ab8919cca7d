//! # cloudstore-service
//!
//! Business logic for CloudStore. The data service keeps the metadata
//! store and the physical store coherent across create, read, rename and
//! delete; the user service provisions tenants.
//!
//! Services follow constructor injection; every dependency is provided
//! at construction time via `Arc` references.

pub mod access;
pub mod context;
pub mod data;
pub mod resolver;
pub mod user;

pub use access::AccessGuard;
pub use context::Identity;
pub use data::{
    CreatePayload, DataService, DownloadArtifact, ReadMode, ReadOutcome, UploadFile,
};
pub use resolver::PathResolver;
pub use user::{NewUser, UserService};
