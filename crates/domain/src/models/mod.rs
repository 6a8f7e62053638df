//! Domain models for the client directory.

pub mod client;

pub use client::{Client, ClientFilter, ClientUpdate, NewClient, UpdateOutcome};
