use std::time::Duration;

use crate::request::Request;
use crate::response::Response;

/// Middleware runs around route matching and handler execution.
///
/// `before` may short-circuit by returning a response of its own, in which
/// case the handler never runs; returning `None` passes the request along,
/// possibly after installing context values for the handler to read.
/// Middleware attached to a single route runs after that route has matched.
///
/// # Example
///
/// ```rust,ignore
/// use switchback::middleware::Middleware;
/// use switchback::{Request, Response};
///
/// struct RequireToken;
///
/// impl Middleware for RequireToken {
///     fn before(&self, req: &mut Request) -> Option<Response> {
///         if req.header("authorization").is_none() {
///             return Some(Response::status(403));
///         }
///         None // continue to the handler
///     }
/// }
/// ```
pub trait Middleware: Send + Sync {
    /// Called before matching (router middleware) or before the handler
    /// (route middleware). `Some(response)` short-circuits.
    fn before(&self, _req: &mut Request) -> Option<Response> {
        None
    }

    /// Called with every outgoing response and the time spent producing it.
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}
