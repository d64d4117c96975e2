use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde_json::json;
use tracing::{info, warn};

use crate::context;
use crate::middleware::Middleware;
use crate::path;
use crate::pattern::{self, Part, PatternError};
use crate::request::Request;
use crate::response::Response;
use crate::route::Route;
use crate::tree::{RouteTree, NO_LEAF_ID};

/// Error raised while configuring a router.
#[derive(Debug)]
pub enum RouterError {
    /// A route expression failed to parse.
    InvalidPattern(PatternError),
    /// A configuration step rejected the router.
    Config(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidPattern(err) => write!(f, "invalid route pattern: {err}"),
            RouterError::Config(msg) => write!(f, "router configuration rejected: {msg}"),
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::InvalidPattern(err) => Some(err),
            RouterError::Config(_) => None,
        }
    }
}

impl From<PatternError> for RouterError {
    fn from(err: PatternError) -> Self {
        RouterError::InvalidPattern(err)
    }
}

/// A request handler bound to a route.
pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn handle(&self, req: &Request) -> Response {
        self(req)
    }
}

/// Default fallback: `404` with body `not found`.
struct NotFound;

impl Handler for NotFound {
    fn handle(&self, _req: &Request) -> Response {
        Response::not_found()
    }
}

/// Sentinel for routes reserved without a handler.
struct NotImplemented;

impl Handler for NotImplemented {
    fn handle(&self, _req: &Request) -> Response {
        Response::json(501, json!({ "error": "Not Implemented" }))
    }
}

/// Routes requests to handlers through the pattern trie.
///
/// A router has a build phase (`&mut self`: `handle`, `mount`, setters) and
/// a serve phase (`&self`: [`Router::serve`]); finish configuration before
/// serving concurrently.
pub struct Router {
    tree: RouteTree,
    routes: BTreeMap<u64, Arc<Route>>,
    handlers: HashMap<u64, Arc<dyn Handler>>,
    middleware: Vec<Arc<dyn Middleware>>,
    not_found: Arc<dyn Handler>,
    max_params: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self {
            tree: RouteTree::new(),
            routes: BTreeMap::new(),
            handlers: HashMap::new(),
            middleware: Vec::new(),
            not_found: Arc::new(NotFound),
            max_params: 0,
        }
    }

    /// Parse `pattern` and bind `handler` to it. Returns the leaf id.
    pub fn handle<H>(&mut self, method: Method, pattern: &str, handler: H) -> Result<u64, RouterError>
    where
        H: Handler + 'static,
    {
        let route = Route::new(method, pattern)?;
        Ok(self.insert(route, Arc::new(handler)))
    }

    /// [`Router::handle`] for plain functions and closures.
    pub fn handle_fn<F>(&mut self, method: Method, pattern: &str, f: F) -> Result<u64, RouterError>
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.handle(method, pattern, f)
    }

    /// Bind `handler` to an already-built route.
    pub fn handle_route<H>(&mut self, route: Route, handler: H) -> u64
    where
        H: Handler + 'static,
    {
        self.insert(route, Arc::new(handler))
    }

    /// Register `pattern` without a handler; matching requests get
    /// `501 Not Implemented`.
    pub fn reserve(&mut self, method: Method, pattern: &str) -> Result<u64, RouterError> {
        let route = Route::new(method, pattern)?;
        Ok(self.insert(route, Arc::new(NotImplemented)))
    }

    fn insert(&mut self, route: Route, handler: Arc<dyn Handler>) -> u64 {
        let leaf_id = self.tree.add(&route);
        self.max_params = self.max_params.max(route.num_params());
        self.routes.insert(leaf_id, Arc::new(route));
        self.handlers.insert(leaf_id, handler);
        leaf_id
    }

    /// Replace the fallback handler invoked when no route matches.
    pub fn with_not_found<H>(&mut self, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        self.not_found = Arc::new(handler);
        self
    }

    /// Append router-level middleware; it runs for every request in
    /// registration order.
    pub fn with_middleware(&mut self, mw: Arc<dyn Middleware>) -> &mut Self {
        self.middleware.push(mw);
        self
    }

    /// Largest number of named parameters any registered route captures.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Re-register every route of `sub` under `prefix`, restricted to
    /// `methods` (empty = all). The prefix must consist of literal
    /// segments only.
    pub fn mount(
        &mut self,
        prefix: &str,
        sub: &Router,
        methods: &[Method],
    ) -> Result<(), RouterError> {
        for token in path::tokenize(prefix) {
            match pattern::parse(token)? {
                Part::Literal(_) => {}
                _ => {
                    return Err(RouterError::Config(format!(
                        "mount prefix {prefix:?} must contain only literal segments"
                    )))
                }
            }
        }
        for (leaf_id, route) in &sub.routes {
            if !methods.is_empty() && !methods.contains(route.method()) {
                continue;
            }
            let expr = format!("{prefix}{}", route.expression());
            let mounted = Route::with_options(
                route.method().clone(),
                &expr,
                route.required().to_vec(),
                route.middleware().to_vec(),
            )?;
            let handler = sub
                .handlers
                .get(leaf_id)
                .cloned()
                .unwrap_or_else(|| Arc::new(NotImplemented));
            self.insert(mounted, handler);
        }
        Ok(())
    }

    /// Route `req` and produce its response.
    ///
    /// Prepares a fresh parameter scratch, runs router middleware (a
    /// `Some` from `before` short-circuits), matches the trie, runs the
    /// matched route's own middleware, and invokes the bound handler, or
    /// the fallback when nothing matched. Every middleware `after` sees
    /// the outgoing response.
    pub fn serve(&self, req: &mut Request) -> Response {
        context::prepare(req, self.max_params);
        let start = Instant::now();

        let mut early = None;
        for mw in &self.middleware {
            if let Some(resp) = mw.before(req) {
                early = Some(resp);
                break;
            }
        }
        let mut response = match early {
            Some(resp) => resp,
            None => self.dispatch(req),
        };

        let latency = start.elapsed();
        for mw in &self.middleware {
            mw.after(req, &mut response, latency);
        }
        response
    }

    fn dispatch(&self, req: &mut Request) -> Response {
        let leaf_id = self.tree.match_route(req);
        if leaf_id == NO_LEAF_ID {
            info!(method = %req.method, path = %req.path, "no route matched");
            return self.not_found.handle(req);
        }
        let Some(handler) = self.handlers.get(&leaf_id) else {
            // Unreachable for routers built through the public surface.
            warn!(leaf_id, "matched leaf has no handler");
            return NotImplemented.handle(req);
        };
        if let Some(route) = self.routes.get(&leaf_id) {
            info!(
                method = %req.method,
                path = %req.path,
                pattern = route.expression(),
                leaf_id,
                "route matched"
            );
            route.capture_params(req);
            for mw in route.middleware() {
                if let Some(resp) = mw.before(req) {
                    return resp;
                }
            }
        }
        handler.handle(req)
    }
}
