//! CloudStore: multi-tenant file storage with a metadata/filesystem
//! consistency engine.

pub mod app;

pub use app::AppContext;
