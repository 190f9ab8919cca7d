//! Physical store implementations.

pub mod local;

pub use local::LocalPhysicalStore;
