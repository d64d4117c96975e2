//! The matching trie.
//!
//! One root per HTTP method; routes sharing interior literal prefixes are
//! merged on insertion, and matching walks the tree depth-first in
//! insertion order so earlier declarations win at equal specificity.

mod core;

pub use core::{RouteTree, NO_LEAF_ID};
