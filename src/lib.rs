//! aeroindex - an embeddable in-memory object store with secondary indexes
//!
//! Layers, leaves first:
//! - `collections`: sorted array and AVL tree keyed by a comparer
//! - `index`: hash, sorted-array and AVL indexes behind one trait
//! - `query`: loose filter parsing and index-backed evaluation
//! - `store`: primary table fanning mutations out to its indexes
//!
//! `observability` provides structured logging and counters, `cli` the
//! `aeroindex` binary.
//!
//! Nothing here is synchronized: a store and its indexes must be owned
//! by one thread, or guarded externally.

pub mod cli;
pub mod collections;
pub mod index;
pub mod observability;
pub mod query;
pub mod store;
