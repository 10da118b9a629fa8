//! Ordered containers backing the secondary indexes
//!
//! Both structures are keyed by an explicit [`Comparer`] supplied at
//! construction; there is no implicit default ordering.
//!
//! - [`BinaryArray`]: sorted vector with binary-search positioning
//! - [`AvlTree`]: arena-backed self-balancing binary search tree
//!
//! # Invariants
//!
//! - BinaryArray keys are strictly ascending under the comparer
//! - Every AVL node has `balance = height(left) - height(right)` in {-1, 0, 1}
//! - AVL in-order traversal yields non-decreasing keys

mod avl;
mod binary_array;
mod comparer;
mod errors;

pub use avl::{AvlTree, Iter, NodeId};
pub use binary_array::{BinaryArray, Entry};
pub use comparer::Comparer;
pub use errors::{CollectionError, CollectionErrorCode, CollectionResult, Severity};
