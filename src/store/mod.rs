//! Indexed in-memory store
//!
//! [`InMemoryStore`] owns the entries and fans mutations out to its
//! indexes. [`StoreConfig`] declares a store of JSON documents.

mod config;
mod errors;
mod memory;

pub use config::{field_key, IndexDefinition, SortOrder, StoreConfig};
pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryStore;
