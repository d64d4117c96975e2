//! Per-request routing context.
//!
//! Matching writes captured parameters into a bounded scratch attached to
//! the request. The context wraps whatever context the request already
//! carried: deadline, cancellation, and user-value lookups forward to the
//! parent, while parameter lookups are answered from the scratch alone.

mod core;
#[cfg(test)]
mod tests;

pub use core::{
    prepare, reset, ContextError, Key, ParamScratch, ParamVec, RequestContext,
    DEFAULT_MAX_PARAMS, MAX_INLINE_PARAMS,
};
