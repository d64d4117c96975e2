//! The router façade.
//!
//! Owns the matching trie, maps leaf ids to handlers, runs the middleware
//! chain, and falls back to a not-found handler when nothing matches.
//! Configuration happens up front; serving is read-only (`&self`), so a
//! configured router is shared behind an `Arc` across serving coroutines.

mod core;
#[cfg(test)]
mod tests;

pub use core::{Handler, Router, RouterError};
