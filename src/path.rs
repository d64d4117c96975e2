//! Path tokenization.
//!
//! Route expressions and request paths are walked with the same cursor
//! tokenizer: [`next`] returns the token starting at a cursor together with
//! the cursor of the following segment, or `None` when no non-empty segment
//! remains. Consecutive and trailing `/` produce no tokens, so `/a///b`
//! tokenizes like `/a/b` and `/a/` like `/a`. Percent escapes are not
//! decoded here; that is the caller's concern.

/// Advance to the next token of `expr`.
///
/// The first call uses `cursor = 0`; subsequent calls use the cursor from
/// the previous result. For an empty or slash-only expression the first
/// call yields `("", None)`; the empty token stands for the root segment,
/// which is how `/` routes stay representable.
pub fn next(expr: &str, cursor: usize) -> (&str, Option<usize>) {
    let bytes = expr.as_bytes();
    let mut start = cursor;
    while start < bytes.len() && bytes[start] == b'/' {
        start += 1;
    }
    let mut end = start;
    while end < bytes.len() && bytes[end] != b'/' {
        end += 1;
    }
    // Look ahead so the cursor is `None` whenever only slashes remain.
    let mut rest = end;
    while rest < bytes.len() && bytes[rest] == b'/' {
        rest += 1;
    }
    let token = &expr[start..end];
    if rest < bytes.len() {
        (token, Some(end))
    } else {
        (token, None)
    }
}

/// Collect every token of `expr`. Empty and slash-only expressions yield a
/// single empty token.
pub fn tokenize(expr: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    loop {
        let (token, next_cursor) = next(expr, cursor);
        tokens.push(token);
        match next_cursor {
            Some(c) => cursor = c,
            None => break,
        }
    }
    tokens
}
