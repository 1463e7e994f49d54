//! Route segments and request path splitting.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{RouterConfig, TrailingSlash};

static CAPTURE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid capture key regex"));

/// One declared component of a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly this text.
    Static(String),
    /// Matches any single segment and binds it under this key.
    Capture(String),
}

impl Segment {
    /// Creates a literal segment.
    pub fn literal(label: impl Into<String>) -> Self {
        Self::Static(label.into())
    }

    /// Creates a capture segment.
    pub fn capture(key: impl Into<String>) -> Self {
        Self::Capture(key.into())
    }

    /// Parses one segment of route syntax.
    ///
    /// - `users` - literal
    /// - `{id}` - capture bound to `id`
    pub fn parse(text: &str) -> Result<Self, &'static str> {
        if text.is_empty() {
            return Err("empty segment");
        }
        if text.contains('/') {
            return Err("segment contains '/'");
        }
        if let Some(key) = text.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            return Self::capture(key).validate();
        }
        Self::literal(text).validate()
    }

    /// Checks a segment built directly through [`literal`](Self::literal)
    /// or [`capture`](Self::capture).
    pub(crate) fn validate(self) -> Result<Self, &'static str> {
        match &self {
            Self::Static(label) => {
                if label.is_empty() {
                    return Err("empty segment");
                }
                if label.contains(['/', '{', '}']) {
                    return Err("literal contains '/', '{' or '}'");
                }
            }
            Self::Capture(key) => {
                if !CAPTURE_KEY.is_match(key) {
                    return Err("capture key must match [A-Za-z_][A-Za-z0-9_]*");
                }
            }
        }
        Ok(self)
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(label) => f.write_str(label),
            Self::Capture(key) => write!(f, "{{{key}}}"),
        }
    }
}

/// Splits a request path into the segments the matcher consumes.
///
/// Returns `None` when the path is rejected outright by a strict
/// trailing-slash policy.
pub(crate) fn split_path<'p>(path: &'p str, config: &RouterConfig) -> Option<Vec<Cow<'p, str>>> {
    let decode = |s: &'p str| {
        if config.decode_segments {
            percent_decode(s)
        } else {
            Cow::Borrowed(s)
        }
    };

    match config.trailing_slash {
        TrailingSlash::Ignore => Some(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(decode)
                .collect(),
        ),
        TrailingSlash::Strict => {
            if path.is_empty() || path == "/" {
                return Some(Vec::new());
            }
            let rest = path.strip_prefix('/')?;
            let mut segments = Vec::new();
            for raw in rest.split('/') {
                if raw.is_empty() {
                    return None;
                }
                segments.push(decode(raw));
            }
            Some(segments)
        }
    }
}

/// Decodes `%XX` escapes.
///
/// Returns the input unchanged if an escape is malformed or the decoded
/// bytes are not UTF-8.
pub(crate) fn percent_decode(s: &str) -> Cow<'_, str> {
    if !s.contains('%') {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                .and_then(|hex| std::str::from_utf8(hex).ok())
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            match byte {
                Some(b) => {
                    out.push(b);
                    i += 3;
                }
                None => return Cow::Borrowed(s),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    match String::from_utf8(out) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(s),
    }
}
