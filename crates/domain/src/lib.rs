//! Domain layer for the client directory.
//!
//! This crate contains the value types exchanged with callers:
//! - `Client` records with their grouped phone numbers
//! - Inputs for creation, partial updates and searches
//! - Update outcomes

pub mod models;
