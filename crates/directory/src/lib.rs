//! Client directory: clients, their phone numbers, and the operations on them.
//!
//! This crate contains:
//! - `ClientDirectory`, the component callers use
//! - The error taxonomy surfaced from storage
//! - Layered configuration loading
//! - Logging initialization

pub mod config;
pub mod directory;
pub mod error;
pub mod logging;

pub use config::Config;
pub use directory::ClientDirectory;
pub use domain::models::{Client, ClientFilter, ClientUpdate, NewClient, UpdateOutcome};
pub use error::DirectoryError;
pub use persistence::db::DatabaseConfig;
