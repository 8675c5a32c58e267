//! lazytree: an ordered dictionary that defers sorting work until queries
//! demand it
//!
//! An implementation of the lazy search tree data structure, from the paper
//! "Lazy Search Trees" by Sandlund & Wild. The structure combines:
//! - A splay tree of *gaps*, contiguous keyspace regions whose internal
//!   order is not yet known
//! - Per-gap *interval* sequences backed by linked lists of key buckets,
//!   so bulk merges are O(1) pointer splices
//! - Query-driven restructuring that splits a gap around each queried key
//!
//! After n inserts and q membership queries, total work is
//! O(min(n log n, n log q + q log n)) comparisons with O(min(n, q log n))
//! pointers: few queries mean little sorting ever happens, and pure bulk
//! insertion is linear.
//!
//! # Examples
//!
//! ```
//! use lazytree::LazySearchTree;
//!
//! let mut tree = LazySearchTree::new();
//! for key in (1..=1000u64).rev() {
//!     tree.insert(key);
//! }
//! assert_eq!(tree.len(), 1000);
//! assert!(tree.contains(&500));
//! assert!(!tree.contains(&1001));
//! ```

pub mod compare;
pub mod gap;
pub mod interval;
pub mod splay;
pub mod tree;

pub use compare::{Compare, NaturalOrder};
pub use gap::Gap;
pub use interval::Interval;
pub use splay::SplayTree;
pub use tree::{LazySearchTree, LazyTreeConfig, LazyTreeStats};

#[cfg(test)]
mod oracle_tests;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
