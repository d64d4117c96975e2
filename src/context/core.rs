use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;

use crate::request::Request;

/// Scratch capacity used when nothing better is known, e.g. when preparing
/// a request by hand in tests. Routers size the scratch from their routes.
pub const DEFAULT_MAX_PARAMS: usize = 8;

/// Number of parameter slots stored inline before spilling to the heap.
/// Few routes capture more than a handful of segments.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Inline storage for captured parameters. Keys are `Arc<str>`: they come
/// from the static route patterns, so cloning a name is an atomic bump
/// rather than a copy.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// More distinct parameters were set than the scratch was sized for.
    CapacityExceeded { capacity: usize },
    /// The request does not carry a routing context.
    WrongContextType,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::CapacityExceeded { capacity } => {
                write!(f, "parameter scratch capacity ({capacity}) exceeded")
            }
            ContextError::WrongContextType => {
                write!(f, "request does not carry a routing context")
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Fixed-capacity key/value storage for captured route parameters.
///
/// `set` overwrites an existing key in place; a new key appends while there
/// is room and fails with [`ContextError::CapacityExceeded`] otherwise.
/// Overwriting keeps multi-tail accumulation (repeated sets of one name)
/// within a single slot, so capacity bounds the number of *distinct* names.
#[derive(Debug)]
pub struct ParamScratch {
    entries: ParamVec,
    capacity: usize,
}

impl ParamScratch {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: ParamVec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn set(&mut self, key: &str, value: String) -> Result<(), ContextError> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.as_ref() == key) {
            entry.1 = value;
            return Ok(());
        }
        if self.entries.len() >= self.capacity {
            return Err(ContextError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        self.entries.push((Arc::from(key), value));
        Ok(())
    }

    /// Value bound under `key`, or the empty string when absent.
    pub fn get(&self, key: &str) -> &str {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Drop all entries, retaining the allocation.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Lookup key for [`RequestContext::value`]. Parameter keys are a dedicated
/// variant so lookups can tell captured route parameters apart from
/// pass-through user values.
#[derive(Debug, Clone, Copy)]
pub enum Key<'a> {
    Param(&'a str),
    Value(&'a str),
}

/// Context attached to an in-flight request.
///
/// Wraps the request's previous context (if any) rather than mutating it:
/// deadline, cancellation, and unknown value lookups forward to the parent,
/// while the parameter scratch and the error slot belong to this layer. The
/// context's own error takes precedence over the parent's.
#[derive(Debug, Default)]
pub struct RequestContext {
    parent: Option<Box<RequestContext>>,
    params: ParamScratch,
    values: Vec<(Arc<str>, String)>,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    error: Option<ContextError>,
}

impl Default for ParamScratch {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARAMS)
    }
}

impl RequestContext {
    pub fn new(max_params: usize) -> Self {
        Self {
            parent: None,
            params: ParamScratch::new(max_params),
            values: Vec::new(),
            deadline: None,
            cancel: None,
            error: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The nearest deadline in this context chain.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
            .or_else(|| self.parent.as_ref().and_then(|p| p.deadline()))
    }

    /// Whether this context or any ancestor has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// The context error, preferring this layer's over the parent's.
    pub fn err(&self) -> Option<&ContextError> {
        self.error
            .as_ref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.err()))
    }

    pub(crate) fn record_error(&mut self, error: ContextError) {
        self.error.get_or_insert(error);
    }

    /// Captured parameter by name; empty when absent. Never consults the
    /// parent; parameters belong to this match attempt.
    pub fn param(&self, name: &str) -> &str {
        self.params.get(name)
    }

    pub fn set_param(&mut self, name: &str, value: String) -> Result<(), ContextError> {
        self.params.set(name, value)
    }

    /// Install a user value visible to handlers via [`Key::Value`] lookups.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(entry) = self.values.iter_mut().find(|(k, _)| k.as_ref() == key) {
            entry.1 = value;
        } else {
            self.values.push((Arc::from(key), value));
        }
    }

    /// Keyed lookup. Parameter keys are answered from the scratch only;
    /// user-value keys fall through to the parent chain.
    pub fn value(&self, key: Key<'_>) -> Option<&str> {
        match key {
            Key::Param(name) => {
                let value = self.params.get(name);
                (!value.is_empty()).then_some(value)
            }
            Key::Value(name) => self
                .values
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str())
                .or_else(|| self.parent.as_ref().and_then(|p| p.value(Key::Value(name)))),
        }
    }

    pub fn params(&self) -> &ParamScratch {
        &self.params
    }
}

/// Attach a fresh routing context to `req`, wrapping any context already
/// present. The scratch is sized to `max_params` distinct names.
pub fn prepare(req: &mut Request, max_params: usize) {
    let parent = req.take_context();
    let mut ctx = RequestContext::new(max_params);
    ctx.parent = parent.map(Box::new);
    req.set_context(ctx);
}

/// Clear captured parameters so the request can be matched again. Fails
/// when `req` does not carry a routing context.
pub fn reset(req: &mut Request) -> Result<(), ContextError> {
    match req.context_mut() {
        Some(ctx) => {
            ctx.params.reset();
            Ok(())
        }
        None => Err(ContextError::WrongContextType),
    }
}
