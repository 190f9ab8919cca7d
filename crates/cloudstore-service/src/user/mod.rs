//! User management services.

pub mod service;

pub use service::{NewUser, UserService};
