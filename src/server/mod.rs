//! HTTP wire layer, built on `may_minihttp` and the `may` coroutine
//! runtime.
//!
//! The library core is server-independent; this module adapts it to the
//! wire. [`RouterService`] lifts each incoming `may_minihttp` request into
//! the in-process [`crate::Request`] model, hands it to the router, and
//! writes the resulting [`crate::Response`] back. [`HttpServer`] wraps the
//! `may_minihttp` server and returns a [`ServerHandle`] for readiness
//! polling and shutdown.
//!
//! ```text
//! connection → RouterService → Router::serve → trie match → handler
//! ```

mod http_server;
mod service;
mod wire;

pub use http_server::{HttpServer, ServerHandle};
pub use service::RouterService;
pub use wire::{write_json_error, write_response};
