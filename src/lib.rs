//! Word-occurrence indexes: four interchangeable ordered maps from text tokens to
//! the number of times each token was inserted.
//!
//! - [`BinarySearchTree`]: unbalanced baseline.
//! - [`AvlTree`]: height-balanced through LL, RR, LR and RL rotations.
//! - [`RedBlackTree`]: balanced through recoloring and rotations.
//! - [`SkipList`]: probabilistically balanced lanes.
//!
//! All of them implement [`WordIndex`], and for the same inserts list the same
//! entries in the same order.
//!
//! ```
//! use word_index::{Entry, Kind, WordIndex};
//!
//! for kind in Kind::ALL {
//!     let mut index = kind.build_seeded(0);
//!     for token in ["b", "a", "c", "a"] {
//!         index.insert(token);
//!     }
//!     let listed: Vec<Entry> = index.entries().collect();
//!     assert_eq!(
//!         listed,
//!         vec![Entry::new(1, "a", 2), Entry::new(2, "b", 1), Entry::new(3, "c", 1)]
//!     );
//! }
//! ```

pub mod avl;
pub mod bst;
mod error;
mod index;
mod kind;
pub mod rbt;
pub mod skip_list;

pub use avl::AvlTree;
pub use bst::BinarySearchTree;
pub use error::{Error, Result};
pub use index::{Entries, Entry, WordIndex};
pub use kind::Kind;
pub use rbt::{Color, RedBlackTree};
pub use skip_list::{SkipList, SkipListConfig};

#[cfg(test)]
mod tests;
