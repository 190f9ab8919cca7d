//! Data tree services.

pub mod service;
pub mod types;

pub use service::DataService;
pub use types::{CreatePayload, DownloadArtifact, ReadMode, ReadOutcome, UploadFile};
