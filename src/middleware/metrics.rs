use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Middleware collecting request counters.
///
/// Tracks total requests, cumulative latency, and how many requests fell
/// through to the not-found handler. All counters are atomics, safe to
/// share across serving coroutines without locks.
pub struct MetricsMiddleware {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    not_found_count: AtomicUsize,
}

impl Default for MetricsMiddleware {
    fn default() -> Self {
        Self {
            request_count: AtomicUsize::new(0),
            total_latency_ns: AtomicU64::new(0),
            not_found_count: AtomicUsize::new(0),
        }
    }
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of requests seen.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Mean time from accepting a request to producing its response.
    /// Zero when no request has completed yet.
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Number of responses that went out with status 404.
    pub fn not_found_count(&self) -> usize {
        self.not_found_count.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _req: &mut Request) -> Option<Response> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn after(&self, _req: &Request, res: &mut Response, latency: Duration) {
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if res.status == 404 {
            self.not_found_count.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn counts_requests_and_latency() {
        let metrics = MetricsMiddleware::new();
        let mut req = Request::new(Method::GET, "/");
        let mut res = Response::status(200);

        for _ in 0..3 {
            metrics.before(&mut req);
            metrics.after(&req, &mut res, Duration::from_millis(100));
        }

        assert_eq!(metrics.request_count(), 3);
        assert_eq!(metrics.average_latency(), Duration::from_millis(100));
        assert_eq!(metrics.not_found_count(), 0);
    }

    #[test]
    fn counts_not_found_responses() {
        let metrics = MetricsMiddleware::new();
        let mut req = Request::new(Method::GET, "/missing");
        let mut res = Response::not_found();
        metrics.before(&mut req);
        metrics.after(&req, &mut res, Duration::from_millis(1));
        assert_eq!(metrics.not_found_count(), 1);
    }

    #[test]
    fn zero_requests_means_zero_latency() {
        let metrics = MetricsMiddleware::new();
        assert_eq!(metrics.request_count(), 0);
        assert_eq!(metrics.average_latency(), Duration::from_nanos(0));
    }
}
