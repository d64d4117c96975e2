use may_minihttp::Response as WireResponse;
use serde_json::Value;

use crate::response::Response;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write an in-process response to the wire. String bodies go out as
/// `text/plain`, other JSON values as `application/json`, and a null body
/// as an empty response.
pub fn write_response(res: &mut WireResponse, response: Response) {
    res.status_code(response.status as usize, status_reason(response.status));
    match response.body {
        Value::Null => {}
        Value::String(s) => {
            res.header("Content-Type: text/plain");
            res.body_vec(s.into_bytes());
        }
        other => {
            res.header("Content-Type: application/json");
            res.body_vec(serde_json::to_vec(&other).unwrap_or_default());
        }
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut WireResponse, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
