//! # cloudstore-entity
//!
//! Domain entity models for CloudStore. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod attachment;
pub mod data;
pub mod user;
