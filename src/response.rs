//! Response model produced by handlers and middleware.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::request::HeaderVec;

/// An in-process HTTP response. String bodies are written to the wire as
/// `text/plain`, any other JSON value as `application/json`.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl Response {
    /// A bodyless response with the given status.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body: Value::Null,
        }
    }

    /// A `200 OK` plain-text response.
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::String(body.into()),
        }
    }

    /// A JSON response with the given status.
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    /// The default fallback response.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            headers: HeaderVec::new(),
            body: Value::String("not found".to_string()),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Header value by case-insensitive name.
    pub fn get_header(&self, name: &str) -> Option<&str> {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_body_is_a_json_string() {
        let res = Response::text("hello");
        assert_eq!(res.status, 200);
        assert_eq!(res.body, Value::String("hello".to_string()));
    }

    #[test]
    fn with_status_overrides() {
        let res = Response::text("nope").with_status(403);
        assert_eq!(res.status, 403);
    }

    #[test]
    fn header_roundtrip() {
        let mut res = Response::status(204);
        res.set_header("X-Total-Count", "3");
        assert_eq!(res.get_header("x-total-count"), Some("3"));
    }
}
