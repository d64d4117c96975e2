use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Shape of a bare `+` tail: one word-character segment.
static ANY_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\w+)$").expect("failed to compile any-word regex"));

/// Malformed pattern token, reported at route build time.
#[derive(Debug, Clone)]
pub enum PatternError {
    /// A `[` without a closing `]`.
    UnbalancedBracket { token: String },
    /// A `{` without a closing `}`, or trailing text after a `]` that is not
    /// a brace group.
    UnbalancedBrace { token: String },
    /// The brace body is not a valid regex.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::UnbalancedBracket { token } => {
                write!(f, "unbalanced '[' in pattern segment '{token}'")
            }
            PatternError::UnbalancedBrace { token } => {
                write!(f, "unbalanced '{{' in pattern segment '{token}'")
            }
            PatternError::InvalidRegex { pattern, source } => {
                write!(f, "invalid regex '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for PatternError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatternError::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One segment matcher of a route pattern.
///
/// Parameter names are capture labels, not identity: [`Part::same_shape`]
/// ignores them so the trie can merge structurally equal segments.
#[derive(Debug, Clone)]
pub enum Part {
    /// Matches exactly one token equal to the literal.
    Literal(String),
    /// Matches any non-empty token and binds it under the name.
    Param(String),
    /// Matches one token the regex accepts in full, optionally binding it.
    Regex {
        param: Option<String>,
        pattern: Regex,
    },
    /// Matches the inner part over each remaining token of the path. Only
    /// valid as the last part of a route. A named multi accumulates the
    /// matched tail as `/`-joined segments.
    Multi {
        param: Option<String>,
        inner: Box<Part>,
    },
}

impl Part {
    /// Whether `token` satisfies this segment matcher.
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Part::Literal(lit) => lit == token,
            Part::Param(_) => !token.is_empty(),
            Part::Regex { pattern, .. } => pattern.is_match(token),
            Part::Multi { inner, .. } => inner.matches(token),
        }
    }

    /// Structural identity used for trie merging. Capture names are ignored.
    pub fn same_shape(&self, other: &Part) -> bool {
        match (self, other) {
            (Part::Literal(a), Part::Literal(b)) => a == b,
            (Part::Param(_), Part::Param(_)) => true,
            (Part::Regex { pattern: a, .. }, Part::Regex { pattern: b, .. }) => {
                a.as_str() == b.as_str()
            }
            (Part::Multi { inner: a, .. }, Part::Multi { inner: b, .. }) => a.same_shape(b),
            _ => false,
        }
    }

    /// The capture name, if this part binds the matched token.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Part::Literal(_) => None,
            Part::Param(name) => (!name.is_empty()).then_some(name.as_str()),
            Part::Regex { param, .. } | Part::Multi { param, .. } => param.as_deref(),
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Part::Multi { .. })
    }

    /// Detach the capture name so it can be lifted onto a wrapping multi.
    fn take_param(&mut self) -> Option<String> {
        match self {
            Part::Literal(_) => None,
            Part::Param(name) => {
                let name = std::mem::take(name);
                (!name.is_empty()).then_some(name)
            }
            Part::Regex { param, .. } | Part::Multi { param, .. } => param.take(),
        }
    }
}

/// Anchor a user regex so it must accept the whole token.
fn compile(raw: &str) -> Result<Regex, PatternError> {
    Regex::new(&format!("^(?:{raw})$")).map_err(|source| PatternError::InvalidRegex {
        pattern: raw.to_string(),
        source,
    })
}

/// Index of the `}` closing the brace group that starts just before `s`,
/// honoring nested braces (counted repetitions like `{4}`).
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

/// Body of `s` when it is exactly one brace group, e.g. `{[\w]{4}}`.
fn brace_body(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('{')?;
    let close = closing_brace(inner)?;
    if close + 1 != inner.len() {
        return None;
    }
    Some(&inner[..close])
}

/// Parse a single pattern token into a [`Part`]; first matching rule wins.
pub fn parse(token: &str) -> Result<Part, PatternError> {
    if let Some(rest) = token.strip_prefix('[') {
        let close = rest.find(']').ok_or_else(|| PatternError::UnbalancedBracket {
            token: token.to_string(),
        })?;
        let name = rest[..close].to_string();
        let after = &rest[close + 1..];
        if after.is_empty() {
            return Ok(Part::Param(name));
        }
        let raw = brace_body(after).ok_or_else(|| PatternError::UnbalancedBrace {
            token: token.to_string(),
        })?;
        return Ok(Part::Regex {
            param: Some(name),
            pattern: compile(raw)?,
        });
    }
    if token.starts_with('{') {
        let raw = brace_body(token).ok_or_else(|| PatternError::UnbalancedBrace {
            token: token.to_string(),
        })?;
        return Ok(Part::Regex {
            param: None,
            pattern: compile(raw)?,
        });
    }
    Ok(Part::Literal(token.to_string()))
}

/// Parse the last token of a route, where a `+` suffix means multi-tail.
///
/// The inner part's capture name is lifted onto the multi so the joined
/// tail is appended exactly once per matched token. A bare `+` wraps the
/// any-word shape.
pub fn parse_tail(token: &str) -> Result<Part, PatternError> {
    match token.strip_suffix('+') {
        None => parse(token),
        Some("") => Ok(Part::Multi {
            param: None,
            inner: Box::new(Part::Regex {
                param: None,
                pattern: ANY_WORD.clone(),
            }),
        }),
        Some(sub) => {
            let mut inner = parse(sub)?;
            let param = inner.take_param();
            Ok(Part::Multi {
                param,
                inner: Box::new(inner),
            })
        }
    }
}
