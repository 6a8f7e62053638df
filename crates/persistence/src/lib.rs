//! Persistence layer for the client directory.
//!
//! This crate contains:
//! - Database connection management
//! - The embedded table schema
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod schema;
