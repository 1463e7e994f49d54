//! Router policies.

use serde::{Deserialize, Serialize};

/// How empty path segments are treated when matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailingSlash {
    /// Drop empty segments, so `/a/`, `//a` and `/a` are the same path.
    #[default]
    Ignore,
    /// Paths must start with `/` and contain no empty segment, except the
    /// bare root `/`. Anything else is not found.
    Strict,
}

/// What happens when a handler is registered twice for the same method on
/// the same node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHandlers {
    /// The later registration replaces the earlier one.
    #[default]
    Replace,
    /// The second registration fails the build.
    Reject,
}

/// Router configuration.
///
/// All fields have defaults, so a partial JSON document is enough:
///
/// ```
/// use oxide_tree_router::{RouterConfig, TrailingSlash};
///
/// let config: RouterConfig = serde_json::from_str(r#"{"trailing_slash": "strict"}"#).unwrap();
/// assert_eq!(config.trailing_slash, TrailingSlash::Strict);
/// assert!(config.decode_segments);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Empty-segment policy.
    pub trailing_slash: TrailingSlash,
    /// Percent-decode each path segment before matching it.
    pub decode_segments: bool,
    /// Re-registration policy for method handlers.
    pub duplicate_handlers: DuplicateHandlers,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            trailing_slash: TrailingSlash::Ignore,
            decode_segments: true,
            duplicate_handlers: DuplicateHandlers::Replace,
        }
    }
}

impl RouterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the empty-segment policy.
    #[must_use]
    pub fn trailing_slash(mut self, policy: TrailingSlash) -> Self {
        self.trailing_slash = policy;
        self
    }

    /// Enables or disables percent-decoding of segments.
    #[must_use]
    pub fn decode_segments(mut self, decode: bool) -> Self {
        self.decode_segments = decode;
        self
    }

    /// Sets the handler re-registration policy.
    #[must_use]
    pub fn duplicate_handlers(mut self, policy: DuplicateHandlers) -> Self {
        self.duplicate_handlers = policy;
        self
    }
}
