//! Request-level route requirements.
//!
//! A requirement is a pure predicate over the request, evaluated once a
//! pattern leaf matches. A route matches only when every attached
//! requirement accepts.

use std::sync::Arc;

use regex::Regex;

use crate::request::Request;

/// A boxed request predicate.
pub type Requirement = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// Evaluate `requirements` against `req`. True only when every predicate
/// accepts; an empty list accepts everything.
pub fn execute(req: &Request, requirements: &[Requirement]) -> bool {
    requirements.iter().all(|requirement| requirement(req))
}

/// Split the request Host header into `(host, port)`. A missing port falls
/// back to the scheme default. Forms with more than one `:` are invalid
/// and yield empty strings, which match no pattern.
fn request_host(req: &Request) -> (String, String) {
    let raw = req.host().unwrap_or("");
    let mut parts = raw.splitn(3, ':');
    let host = parts.next().unwrap_or("");
    match (parts.next(), parts.next()) {
        (None, _) => (host.to_string(), req.scheme.default_port().to_string()),
        (Some(port), None) => (host.to_string(), port.to_string()),
        (Some(_), Some(_)) => (String::new(), String::new()),
    }
}

/// Index of the `}` matching an already-consumed `{`, honoring nesting.
fn closing_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Compile a host pattern into an anchored regex. The pattern is literal
/// text with optional `{regex}` groups, e.g. `{.+}.example.com`.
fn compile_host_pattern(pattern: &str) -> Regex {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    let mut rest = pattern;
    while let Some(open) = rest.find('{') {
        expr.push_str(&regex::escape(&rest[..open]));
        let tail = &rest[open + 1..];
        match closing_brace(tail) {
            Some(close) => {
                expr.push_str("(?:");
                expr.push_str(&tail[..close]);
                expr.push(')');
                rest = &tail[close + 1..];
            }
            None => {
                // Unbalanced brace: treat the remainder literally.
                expr.push_str(&regex::escape(&rest[open..]));
                rest = "";
            }
        }
    }
    expr.push_str(&regex::escape(rest));
    expr.push('$');
    Regex::new(&expr).expect("failed to compile host pattern")
}

/// Accept requests whose Host header names one of `patterns`.
///
/// Patterns are literal hosts, optionally with `{regex}` segments
/// (`{.+}.example.com`). The request port is ignored.
pub fn hosts(patterns: &[&str]) -> Requirement {
    let compiled: Vec<Regex> = patterns.iter().map(|p| compile_host_pattern(p)).collect();
    Arc::new(move |req: &Request| {
        let (host, _port) = request_host(req);
        compiled.iter().any(|re| re.is_match(&host))
    })
}

/// Ports accepted by one host-port pattern.
enum PortSpec {
    /// No port spec and no scheme: any port.
    Any,
    /// No port spec, scheme given: the scheme's default port.
    Exact(u16),
    /// Explicit spec: inclusive ranges (single ports are one-element
    /// ranges). Entries with non-numeric bounds were dropped at parse time,
    /// so an all-invalid spec accepts nothing.
    Ranges(Vec<(u16, u16)>),
}

impl PortSpec {
    fn accepts(&self, port: u16) -> bool {
        match self {
            PortSpec::Any => true,
            PortSpec::Exact(p) => *p == port,
            PortSpec::Ranges(ranges) => ranges.iter().any(|(lo, hi)| (*lo..=*hi).contains(&port)),
        }
    }
}

/// Index of the first `:` outside any `{...}` group: the host/portspec
/// separator, kept clear of colons inside embedded regexes.
fn portspec_separator(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_host_port_pattern(pattern: &str) -> (Regex, PortSpec) {
    let (scheme_port, rest) = match pattern.split_once("://") {
        Some(("https", rest)) => (Some(443), rest),
        Some((_, rest)) => (Some(80), rest),
        None => (None, pattern),
    };
    match portspec_separator(rest) {
        Some(sep) => {
            let mut ranges = Vec::new();
            for entry in rest[sep + 1..].split(',') {
                match entry.split_once('-') {
                    Some((lo, hi)) => {
                        if let (Ok(lo), Ok(hi)) = (lo.parse::<u16>(), hi.parse::<u16>()) {
                            ranges.push((lo, hi));
                        }
                    }
                    None => {
                        if let Ok(port) = entry.parse::<u16>() {
                            ranges.push((port, port));
                        }
                    }
                }
            }
            (compile_host_pattern(&rest[..sep]), PortSpec::Ranges(ranges))
        }
        None => {
            let spec = match scheme_port {
                Some(port) => PortSpec::Exact(port),
                None => PortSpec::Any,
            };
            (compile_host_pattern(rest), spec)
        }
    }
}

/// Accept requests whose Host header satisfies one of the
/// `[scheme://]host[:portspec]` patterns.
///
/// `portspec` is a comma-separated list of ports and `lo-hi` ranges;
/// non-numeric entries are silently dropped. Without a portspec, a scheme
/// prefix pins the port to that scheme's default, and a bare host accepts
/// any port.
pub fn host_ports(patterns: &[&str]) -> Requirement {
    let compiled: Vec<(Regex, PortSpec)> = patterns
        .iter()
        .map(|p| parse_host_port_pattern(p))
        .collect();
    Arc::new(move |req: &Request| {
        let (host, port) = request_host(req);
        let Ok(port) = port.parse::<u16>() else {
            return false;
        };
        compiled
            .iter()
            .any(|(re, spec)| re.is_match(&host) && spec.accepts(port))
    })
}
