use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;

use super::*;
use crate::request::Request;

#[test]
fn set_and_get() {
    let mut scratch = ParamScratch::new(4);
    scratch.set("id", "123".to_string()).unwrap();
    scratch.set("name", "bob".to_string()).unwrap();
    assert_eq!(scratch.get("id"), "123");
    assert_eq!(scratch.get("name"), "bob");
    assert_eq!(scratch.get("missing"), "");
    assert_eq!(scratch.len(), 2);
}

#[test]
fn overwrite_keeps_slot_count() {
    let mut scratch = ParamScratch::new(1);
    scratch.set("p", "/a".to_string()).unwrap();
    scratch.set("p", "/a/b".to_string()).unwrap();
    scratch.set("p", "/a/b/c".to_string()).unwrap();
    assert_eq!(scratch.get("p"), "/a/b/c");
    assert_eq!(scratch.len(), 1);
}

#[test]
fn capacity_exceeded_on_extra_distinct_key() {
    let mut scratch = ParamScratch::new(2);
    scratch.set("a", "1".to_string()).unwrap();
    scratch.set("b", "2".to_string()).unwrap();
    assert_eq!(
        scratch.set("c", "3".to_string()),
        Err(ContextError::CapacityExceeded { capacity: 2 })
    );
    // Earlier entries are untouched.
    assert_eq!(scratch.get("a"), "1");
    assert_eq!(scratch.get("c"), "");
}

#[test]
fn zero_capacity_rejects_everything() {
    let mut scratch = ParamScratch::new(0);
    assert!(scratch.set("a", "1".to_string()).is_err());
}

#[test]
fn reset_clears_entries() {
    let mut scratch = ParamScratch::new(2);
    scratch.set("a", "1".to_string()).unwrap();
    scratch.reset();
    assert!(scratch.is_empty());
    assert_eq!(scratch.get("a"), "");
    // Capacity is unchanged; the scratch is reusable.
    scratch.set("a", "2".to_string()).unwrap();
    scratch.set("b", "3".to_string()).unwrap();
    assert!(scratch.set("c", "4".to_string()).is_err());
}

#[test]
fn prepare_wraps_existing_context() {
    let mut req = Request::new(Method::GET, "/");
    prepare(&mut req, 4);
    req.context_mut()
        .unwrap()
        .set_value("outer", "from-parent");
    req.context_mut()
        .unwrap()
        .set_param("stale", "old".to_string())
        .unwrap();

    prepare(&mut req, 4);
    let ctx = req.context().unwrap();
    // User values forward through the chain; parameters do not.
    assert_eq!(ctx.value(Key::Value("outer")), Some("from-parent"));
    assert_eq!(ctx.param("stale"), "");
    assert_eq!(ctx.value(Key::Param("stale")), None);
}

#[test]
fn value_discriminates_key_kinds() {
    let mut ctx = RequestContext::new(4);
    ctx.set_param("name", "bob".to_string()).unwrap();
    ctx.set_value("name", "user-value");
    assert_eq!(ctx.value(Key::Param("name")), Some("bob"));
    assert_eq!(ctx.value(Key::Value("name")), Some("user-value"));
    assert_eq!(ctx.value(Key::Param("other")), None);
}

#[test]
fn reset_requires_routing_context() {
    let mut req = Request::new(Method::GET, "/");
    assert_eq!(reset(&mut req), Err(ContextError::WrongContextType));

    prepare(&mut req, 2);
    req.context_mut()
        .unwrap()
        .set_param("id", "1".to_string())
        .unwrap();
    reset(&mut req).unwrap();
    assert_eq!(req.param("id"), "");
}

#[test]
fn deadline_forwards_to_parent() {
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut req = Request::new(Method::GET, "/");
    req.set_context(RequestContext::new(0).with_deadline(deadline));
    prepare(&mut req, 4);
    assert_eq!(req.context().unwrap().deadline(), Some(deadline));
}

#[test]
fn cancellation_forwards_to_parent() {
    let flag = Arc::new(AtomicBool::new(false));
    let mut req = Request::new(Method::GET, "/");
    req.set_context(RequestContext::new(0).with_cancel_flag(flag.clone()));
    prepare(&mut req, 4);
    assert!(!req.context().unwrap().is_cancelled());
    flag.store(true, Ordering::Relaxed);
    assert!(req.context().unwrap().is_cancelled());
}

#[test]
fn own_error_takes_precedence() {
    let mut parent = RequestContext::new(0);
    parent.record_error(ContextError::WrongContextType);
    let mut req = Request::new(Method::GET, "/");
    req.set_context(parent);
    prepare(&mut req, 1);

    // Parent error is visible through the wrapper...
    assert_eq!(
        req.context().unwrap().err(),
        Some(&ContextError::WrongContextType)
    );

    // ...until the wrapper records its own.
    req.context_mut()
        .unwrap()
        .record_error(ContextError::CapacityExceeded { capacity: 1 });
    assert_eq!(
        req.context().unwrap().err(),
        Some(&ContextError::CapacityExceeded { capacity: 1 })
    );
}
