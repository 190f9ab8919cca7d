//! Core traits defined in `cloudstore-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, ObjectKind, PhysicalStore};
