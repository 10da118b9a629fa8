//! Secondary indexes
//!
//! An index maps a derived [`IndexKey`] to a bucket of [`ItemId`]s.
//! Three interchangeable backings implement the [`Index`] contract:
//!
//! - [`HashIndex`]: hash map, insertion-ordered keys, emulated ranges
//! - [`BinaryIndex`]: sorted array with binary search
//! - [`AvlIndex`]: AVL tree with pruned range walks
//!
//! # Invariants
//!
//! - A key with an empty bucket never exists
//! - `update(new, old)` removes by the old derived key, then inserts by the new one
//! - `populate` requires an empty index

mod avl;
mod binary;
mod errors;
mod hash;
mod key;
mod traits;

pub use avl::AvlIndex;
pub use binary::BinaryIndex;
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use hash::HashIndex;
pub use key::{IndexKey, ItemId};
pub use traits::{Index, IndexKind, KeyFn};
