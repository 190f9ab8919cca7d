//! # cloudstore-core
//!
//! Core crate for CloudStore. Contains the physical storage trait,
//! configuration schemas, and the unified error system.
//!
//! This crate has **no** internal dependencies on other CloudStore crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
