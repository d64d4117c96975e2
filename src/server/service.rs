use std::io;
use std::io::Read;
use std::sync::Arc;

use http::Method;
use may_minihttp::{HttpService, Request as WireRequest, Response as WireResponse};
use serde_json::json;
use tracing::debug;

use super::wire::{write_json_error, write_response};
use crate::ids::RequestId;
use crate::request::{HeaderVec, Request};
use crate::router::Router;

/// `may_minihttp` service adapter around a configured router.
///
/// Clones share the router; `may_minihttp` clones the service per
/// connection, which is why serving is `&self` on the router.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }
}

/// Lift a wire request into the in-process request model. Fails when the
/// method token is not a valid HTTP method.
fn parse_request(req: WireRequest) -> Result<Request, http::method::InvalidMethod> {
    let method: Method = req.method().parse()?;
    let raw_path = req.path().to_string();

    let mut out = Request::new(method, &raw_path);
    let mut headers = HeaderVec::new();
    for h in req.headers() {
        headers.push((
            Arc::from(h.name.to_ascii_lowercase().as_str()),
            String::from_utf8_lossy(h.value).to_string(),
        ));
    }
    out.headers = headers;

    let mut body = String::new();
    if let Ok(size) = req.body().read_to_string(&mut body) {
        if size > 0 {
            out.body = serde_json::from_str(&body).ok();
        }
    }
    Ok(out)
}

impl HttpService for RouterService {
    fn call(&mut self, req: WireRequest, res: &mut WireResponse) -> io::Result<()> {
        let mut request = match parse_request(req) {
            Ok(request) => request,
            Err(_) => {
                write_json_error(res, 400, json!({ "error": "Bad Request" }));
                return Ok(());
            }
        };
        let request_id = RequestId::from_header_or_new(request.header("x-request-id"));
        debug!(
            %request_id,
            method = %request.method,
            path = %request.path,
            "request accepted"
        );
        let response = self.router.serve(&mut request);
        debug!(%request_id, status = response.status, "response written");
        write_response(res, response);
        Ok(())
    }
}
