use std::sync::Arc;

use http::Method;

use super::*;
use crate::middleware::MetricsMiddleware;
use crate::request::Request;
use crate::response::Response;

fn ok(body: &'static str) -> impl Fn(&Request) -> Response + Send + Sync {
    move |_req: &Request| Response::text(body)
}

fn serve(router: &Router, method: Method, target: &str) -> Response {
    let mut req = Request::new(method, target);
    router.serve(&mut req)
}

#[test]
fn default_not_found() {
    let router = Router::new();
    let res = serve(&router, Method::GET, "/missing");
    assert_eq!(res.status, 404);
    assert_eq!(res.body, serde_json::json!("not found"));
}

#[test]
fn custom_not_found() {
    let mut router = Router::new();
    router.with_not_found(|_req: &Request| Response::text("nothing here").with_status(404));
    let res = serve(&router, Method::GET, "/missing");
    assert_eq!(res.status, 404);
    assert_eq!(res.body, serde_json::json!("nothing here"));
}

#[test]
fn handle_returns_increasing_leaf_ids() {
    let mut router = Router::new();
    assert_eq!(router.handle_fn(Method::GET, "/a", ok("a")).unwrap(), 1);
    assert_eq!(router.handle_fn(Method::GET, "/b", ok("b")).unwrap(), 2);
    assert_eq!(router.handle_fn(Method::POST, "/a", ok("c")).unwrap(), 3);
}

#[test]
fn handle_rejects_invalid_pattern() {
    let mut router = Router::new();
    assert!(matches!(
        router.handle_fn(Method::GET, "/{", ok("never")),
        Err(RouterError::InvalidPattern(_))
    ));
}

#[test]
fn reserved_route_returns_501() {
    let mut router = Router::new();
    router.reserve(Method::GET, "/not/implemented").unwrap();
    let res = serve(&router, Method::GET, "/not/implemented");
    assert_eq!(res.status, 501);
}

#[test]
fn max_params_tracks_the_widest_route() {
    let mut router = Router::new();
    assert_eq!(router.max_params(), 0);
    router.handle_fn(Method::GET, "/a/[x]", ok("1")).unwrap();
    assert_eq!(router.max_params(), 1);
    router
        .handle_fn(Method::GET, "/[a]/[b]/[c]", ok("3"))
        .unwrap();
    assert_eq!(router.max_params(), 3);
    router.handle_fn(Method::GET, "/plain", ok("0")).unwrap();
    assert_eq!(router.max_params(), 3);
}

#[test]
fn metrics_middleware_observes_serving() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut router = Router::new();
    router.handle_fn(Method::GET, "/", ok("root")).unwrap();
    router.with_middleware(metrics.clone());

    assert_eq!(serve(&router, Method::GET, "/").status, 200);
    assert_eq!(serve(&router, Method::GET, "/missing").status, 404);

    assert_eq!(metrics.request_count(), 2);
    assert_eq!(metrics.not_found_count(), 1);
}

#[test]
fn mount_rejects_non_literal_prefix() {
    let mut sub = Router::new();
    sub.handle_fn(Method::GET, "/hello", ok("hi")).unwrap();

    let mut router = Router::new();
    assert!(matches!(
        router.mount("/api/[version]", &sub, &[]),
        Err(RouterError::Config(_))
    ));
    assert!(matches!(
        router.mount("/{", &sub, &[]),
        Err(RouterError::InvalidPattern(_))
    ));
}
