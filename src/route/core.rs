use std::sync::Arc;

use http::Method;

use super::require::Requirement;
use crate::middleware::Middleware;
use crate::path;
use crate::pattern::{self, Part, PatternError};
use crate::request::Request;

/// A declared route: an HTTP method, the pattern expression it was built
/// from, and the parsed segment matchers. Immutable once built.
///
/// The original expression is preserved verbatim and serves as the route's
/// stable identity.
pub struct Route {
    method: Method,
    expr: String,
    parts: Vec<Part>,
    required: Vec<Requirement>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Route {
    /// Parse `expr` into a route. Fails on a malformed pattern.
    pub fn new(method: Method, expr: &str) -> Result<Self, PatternError> {
        Self::builder(method, expr).build()
    }

    /// Parse `expr` into a route, panicking on a malformed pattern. For
    /// declaration sites where the expression is a constant.
    pub fn declare(method: Method, expr: &str) -> Self {
        match Self::new(method, expr) {
            Ok(route) => route,
            Err(err) => panic!("invalid route pattern {expr:?}: {err}"),
        }
    }

    pub fn builder(method: Method, expr: &str) -> RouteBuilder {
        RouteBuilder {
            method,
            expr: expr.to_string(),
            required: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Rebuild a route against a new expression, carrying over predicates
    /// and middleware. Used when mounting a sub-router under a prefix.
    pub(crate) fn with_options(
        method: Method,
        expr: &str,
        required: Vec<Requirement>,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self, PatternError> {
        let mut builder = Self::builder(method, expr);
        builder.required = required;
        builder.middleware = middleware;
        builder.build()
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The expression this route was declared with, verbatim.
    pub fn expression(&self) -> &str {
        &self.expr
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn required(&self) -> &[Requirement] {
        &self.required
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Number of named parameters this route can capture; sizes the
    /// per-request scratch.
    pub fn num_params(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| p.param_name().is_some())
            .count()
    }

    /// Bind this route's named parameters from the request path into the
    /// request's context scratch.
    ///
    /// Call after the route has matched; the path is assumed to satisfy the
    /// parts. A named multi tail accumulates the remaining segments as a
    /// `/`-joined suffix under its one name. A scratch failure is recorded
    /// on the context rather than aborting the request.
    pub fn capture_params(&self, req: &mut Request) {
        let expr = req.path.clone();
        let Some(ctx) = req.context_mut() else {
            return;
        };
        let mut cursor = Some(0usize);
        for part in &self.parts {
            let Some(current) = cursor else { break };
            if part.is_multi() {
                let mut current = Some(current);
                while let Some(c) = current {
                    let (token, next) = path::next(&expr, c);
                    if let Some(name) = part.param_name() {
                        let joined = format!("{}/{token}", ctx.param(name));
                        if let Err(err) = ctx.set_param(name, joined) {
                            ctx.record_error(err);
                        }
                    }
                    current = next;
                }
                break;
            }
            let (token, next) = path::next(&expr, current);
            if let Some(name) = part.param_name() {
                if let Err(err) = ctx.set_param(name, token.to_string()) {
                    ctx.record_error(err);
                }
            }
            cursor = next;
        }
    }
}

/// Builder for [`Route`]. Requirements and middleware accumulate in the
/// order they are attached.
pub struct RouteBuilder {
    method: Method,
    expr: String,
    required: Vec<Requirement>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl RouteBuilder {
    /// Attach a request predicate, evaluated when this route's leaf
    /// matches. All predicates must accept for the route to match.
    pub fn require(mut self, requirement: Requirement) -> Self {
        self.required.push(requirement);
        self
    }

    /// Attach middleware that runs after this route matches, before its
    /// handler.
    pub fn middleware(mut self, mw: Arc<dyn Middleware>) -> Self {
        self.middleware.push(mw);
        self
    }

    pub fn build(self) -> Result<Route, PatternError> {
        let tokens = path::tokenize(&self.expr);
        let last = tokens.len() - 1;
        let mut parts = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            // Only the final segment may carry a `+` multi-tail suffix.
            let part = if i == last {
                pattern::parse_tail(token)?
            } else {
                pattern::parse(token)?
            };
            parts.push(part);
        }
        Ok(Route {
            method: self.method,
            expr: self.expr,
            parts,
            required: self.required,
            middleware: self.middleware,
        })
    }
}
