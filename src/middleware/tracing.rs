use std::time::Duration;

use tracing::{debug, info};

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Middleware emitting one structured log line per served request.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, req: &mut Request) -> Option<Response> {
        debug!(method = %req.method, path = %req.path, "request received");
        None
    }

    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_us = latency.as_micros() as u64,
            "request served"
        );
    }
}
