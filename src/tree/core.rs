use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use http::Method;
use tracing::debug;

use crate::path;
use crate::pattern::Part;
use crate::request::Request;
use crate::route::require::{self, Requirement};
use crate::route::Route;

/// Leaf id reserved for "no match".
pub const NO_LEAF_ID: u64 = 0;

struct Node {
    part: Part,
    children: Vec<Node>,
    leaf_id: u64,
    leaf_required: Vec<Requirement>,
}

impl Node {
    fn new(part: Part) -> Self {
        Self {
            part,
            children: Vec::new(),
            leaf_id: NO_LEAF_ID,
            leaf_required: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.leaf_id != NO_LEAF_ID
    }

    /// Thread `parts` into the subtree rooted here. An exhausted slice
    /// turns this node into the leaf for `leaf_id`; an existing leaf keeps
    /// its id and requirements.
    fn propagate(&mut self, route: &Route, parts: &[Part], leaf_id: u64) {
        let Some((next, rest)) = parts.split_first() else {
            if !self.is_leaf() {
                self.leaf_id = leaf_id;
                self.leaf_required = route.required().to_vec();
            }
            return;
        };
        // Merge into an existing interior child only above the final part.
        // Leaves keep their meaning; final parts stay distinct so each
        // keeps its own requirements. This is also what makes earlier
        // declarations win: later routes sharing a prefix with a leaf get
        // fresh siblings, appended after it.
        if !self.is_leaf() && !rest.is_empty() {
            if let Some(child) = self
                .children
                .iter_mut()
                .find(|c| c.part.same_shape(next) && !c.is_leaf())
            {
                child.propagate(route, rest, leaf_id);
                return;
            }
        }
        let mut child = Node::new(next.clone());
        child.propagate(route, rest, leaf_id);
        self.children.push(child);
    }

    /// Depth-first match of the remaining path against this subtree.
    /// Returns the first accepting leaf id, or [`NO_LEAF_ID`].
    ///
    /// Matching is read-only; parameter binding happens afterwards against
    /// the winning route's own parts, so partially-matched siblings leave
    /// no trace and merged nodes with differing capture names stay correct.
    fn matches(&self, req: &Request, expr: &str, cursor: Option<usize>) -> u64 {
        // An exhausted cursor resolves the current node; this covers the
        // partial-leaf cases where returning early would be wrong.
        let Some(cursor) = cursor else {
            return self.resolve_leaf(req);
        };
        let (token, next) = path::next(expr, cursor);
        if !self.part.matches(token) {
            return NO_LEAF_ID;
        }
        if self.is_leaf() {
            if self.part.is_multi() {
                // A multi leaf consumes the rest of the path on this node.
                return self.matches(req, expr, next);
            }
            if next.is_none() {
                return self.resolve_leaf(req);
            }
            // Pattern exhausted but the path continues; let siblings try.
            return NO_LEAF_ID;
        }
        if next.is_none() {
            // Path exhausted but the pattern is not.
            return NO_LEAF_ID;
        }
        for child in &self.children {
            let leaf_id = child.matches(req, expr, next);
            if leaf_id != NO_LEAF_ID {
                return leaf_id;
            }
        }
        NO_LEAF_ID
    }

    fn resolve_leaf(&self, req: &Request) -> u64 {
        if self.leaf_id == NO_LEAF_ID {
            return NO_LEAF_ID;
        }
        if !require::execute(req, &self.leaf_required) {
            return NO_LEAF_ID;
        }
        self.leaf_id
    }
}

/// Per-method matching trie over all inserted routes.
///
/// Insertions belong to the build phase; once serving starts the tree is
/// only read. The id counter is the sole concurrency primitive.
pub struct RouteTree {
    method_root: HashMap<Method, Node>,
    next_id: AtomicU64,
}

impl Default for RouteTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTree {
    pub fn new() -> Self {
        Self {
            method_root: HashMap::new(),
            next_id: AtomicU64::new(0),
        }
    }

    /// Insert a route and return its leaf id. Ids start at 1, increase by
    /// one per insertion, and are never reused. Inserting the same pattern
    /// twice yields a second id that is unreachable at match time.
    pub fn add(&mut self, route: &Route) -> u64 {
        let root = self
            .method_root
            .entry(route.method().clone())
            // The root is a sentinel; its own part is never matched.
            .or_insert_with(|| Node::new(Part::Literal(String::new())));
        let leaf_id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        root.propagate(route, route.parts(), leaf_id);
        debug!(
            method = %route.method(),
            pattern = route.expression(),
            leaf_id,
            "route inserted"
        );
        leaf_id
    }

    /// Match a request against the trie. Returns the winning leaf id, or
    /// [`NO_LEAF_ID`]. Leaf requirements are evaluated as part of
    /// matching; a rejected leaf falls through to later siblings.
    pub fn match_route(&self, req: &Request) -> u64 {
        let Some(root) = self.method_root.get(&req.method) else {
            return NO_LEAF_ID;
        };
        let expr = req.path.as_str();
        for child in &root.children {
            let leaf_id = child.matches(req, expr, Some(0));
            if leaf_id != NO_LEAF_ID {
                debug!(method = %req.method, path = %expr, leaf_id, "route matched");
                return leaf_id;
            }
        }
        debug!(method = %req.method, path = %expr, "no route matched");
        NO_LEAF_ID
    }
}
