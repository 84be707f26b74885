//! An ordered set implemented with an AVL tree.
//!
//! [`AvlTreeSet`] keeps its values sorted and the tree height-balanced, so
//! lookups, insertions and erasures take logarithmic time. Besides the
//! by-value API known from the standard collections, the set hands out
//! [`Position`]s: handles to single elements that stay valid across
//! unrelated mutations and can be moved forwards and backwards in key order.
//!
//! ```
//! use avl_set::AvlTreeSet;
//!
//! let mut set = AvlTreeSet::from([5, 3, 8, 1, 4, 7, 9]);
//! let (pos, inserted) = set.insert(6);
//! assert!(inserted);
//! assert_eq!(set.key_at(set.successor(pos)), Some(&7));
//!
//! set.erase(set.find(&3));
//! assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 4, 5, 6, 7, 8, 9]);
//! ```
//!
//! The crate logs tree restructuring through the [`log`] facade at `trace`
//! level. Enable the `consistency_check` feature to get
//! [`AvlTreeSet::check_consistency`] outside of this crate's own tests.

mod error;
mod set;
mod tree;

pub use error::{Error, Result};
pub use set::{AvlTreeSet, Cursor, IntoIter, Iter, Position};

#[cfg(test)]
mod proptests;
