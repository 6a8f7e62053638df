//! Database entity definitions (row mappings).

pub mod client;

pub use client::{group_client_rows, ClientPhoneRowEntity};
