//! Server-independent request model.
//!
//! The matcher operates on this in-process representation; the wire layer
//! in [`crate::server`] lifts `may_minihttp` requests into it, and tests
//! construct it directly from a request target.

use std::sync::Arc;

use http::Method;
use serde_json::Value;
use smallvec::SmallVec;

use crate::context::{Key, RequestContext};

/// Inline capacity for header and query storage before spilling to the
/// heap. Typical requests carry well under sixteen headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Inline `(name, value)` storage. Names are `Arc<str>` so repeated
/// lookups and clones stay cheap.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request scheme, used to pick default ports for host predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn default_port(&self) -> &'static str {
        match self {
            Scheme::Http => "80",
            Scheme::Https => "443",
        }
    }
}

/// An in-flight HTTP request as seen by the matcher.
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub scheme: Scheme,
    pub headers: HeaderVec,
    pub query: HeaderVec,
    /// Request body parsed as JSON, when present.
    pub body: Option<Value>,
    context: Option<RequestContext>,
}

impl Request {
    /// Build a request from a target, which is either an absolute URL
    /// (`http://test.com/path?q=1`; scheme, host, and query are lifted
    /// out) or a bare path (`/path?q=1`).
    pub fn new(method: Method, target: &str) -> Self {
        let mut req = Request {
            method,
            path: String::new(),
            scheme: Scheme::Http,
            headers: HeaderVec::new(),
            query: HeaderVec::new(),
            body: None,
            context: None,
        };
        if target.contains("://") {
            if let Ok(parsed) = url::Url::parse(target) {
                if parsed.scheme() == "https" {
                    req.scheme = Scheme::Https;
                }
                if let Some(host) = parsed.host_str() {
                    let host = match parsed.port() {
                        Some(port) => format!("{host}:{port}"),
                        None => host.to_string(),
                    };
                    req.headers.push((Arc::from("host"), host));
                }
                req.path = parsed.path().to_string();
                for (k, v) in parsed.query_pairs() {
                    req.query.push((Arc::from(k.as_ref()), v.into_owned()));
                }
                return req;
            }
        }
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        req.path = path.to_string();
        for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
            req.query.push((Arc::from(k.as_ref()), v.into_owned()));
        }
        req
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            entry.1 = value;
        } else {
            self.headers.push((Arc::from(name), value));
        }
    }

    /// The Host header, when present.
    pub fn host(&self) -> Option<&str> {
        self.header("host")
    }

    /// Query parameter by name; last occurrence wins for repeats.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Captured route parameter by name; empty when absent or when the
    /// request has not been routed yet.
    pub fn param(&self, name: &str) -> &str {
        self.context.as_ref().map(|c| c.param(name)).unwrap_or("")
    }

    /// User value installed by middleware, searched through the context
    /// chain.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.context.as_ref().and_then(|c| c.value(Key::Value(name)))
    }

    pub fn context(&self) -> Option<&RequestContext> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut RequestContext> {
        self.context.as_mut()
    }

    pub fn set_context(&mut self, context: RequestContext) {
        self.context = Some(context);
    }

    pub(crate) fn take_context(&mut self) -> Option<RequestContext> {
        self.context.take()
    }
}
