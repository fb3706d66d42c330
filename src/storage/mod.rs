//! Storage module
//!
//! Persists ingested payloads as individual JSON files under the data directory.

pub mod record;
pub mod store;

pub use store::{RecordStore, StoreError};
