//! Resolving a method and path against the route tree.

use tracing::trace;

use crate::config::RouterConfig;
use crate::handler::{Handler, Hook};
use crate::node::Node;
use crate::request::{Method, Params};
use crate::segment::split_path;

/// The result of matching one request.
pub enum Outcome<'r> {
    /// A handler answers the method at the matched path.
    Matched(Match<'r>),
    /// No node answers the path.
    NotFound,
    /// The path exists but answers none of the requested method.
    /// Carries the methods it does answer.
    MethodNotAllowed(Vec<Method>),
}

impl Outcome<'_> {
    /// Status code the dispatcher assigns for this outcome, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Matched(_) => None,
            Self::NotFound => Some(404),
            Self::MethodNotAllowed(_) => Some(405),
        }
    }

    /// Returns true for [`Outcome::Matched`].
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

impl std::fmt::Debug for Outcome<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched(m) => f
                .debug_struct("Matched")
                .field("captures", &m.captures)
                .field("hooks", &m.hooks.len())
                .finish_non_exhaustive(),
            Self::NotFound => f.write_str("NotFound"),
            Self::MethodNotAllowed(allowed) => {
                f.debug_tuple("MethodNotAllowed").field(allowed).finish()
            }
        }
    }
}

/// A resolved route: its handler, the hooks to run first and the captured
/// path parameters.
pub struct Match<'r> {
    pub(crate) handler: &'r Handler,
    pub(crate) hooks: Vec<&'r Hook>,
    pub(crate) captures: Params,
}

impl Match<'_> {
    /// Parameters captured along the path.
    pub fn captures(&self) -> &Params {
        &self.captures
    }

    /// Number of before-hooks that will run.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

/// Walks the tree one segment at a time.
///
/// A static child always wins over the capture child at the same level.
pub(crate) fn find<'r>(
    root: &'r Node,
    config: &RouterConfig,
    method: Method,
    path: &str,
) -> Outcome<'r> {
    let Some(segments) = split_path(path, config) else {
        trace!(path, "path rejected by trailing slash policy");
        return Outcome::NotFound;
    };

    let mut node = root;
    let mut hooks: Vec<&'r Hook> = Vec::new();
    let mut captures = Params::new();

    for segment in &segments {
        hooks.extend(node.hooks.iter());

        let child = if let Some(child) = node.static_child(segment) {
            trace!(segment = %segment, "static");
            child
        } else if let Some(child) = node.capture_child() {
            if let Some(key) = child.capture_key() {
                trace!(segment = %segment, key, "capture");
                captures.insert(key, &**segment);
            }
            child
        } else {
            trace!(segment = %segment, "no route");
            return Outcome::NotFound;
        };
        node = child;
    }

    hooks.extend(node.hooks.iter());

    if let Some(handler) = node.handler(method) {
        return Outcome::Matched(Match {
            handler,
            hooks,
            captures,
        });
    }

    let allowed = node.allowed_methods();
    if allowed.is_empty() {
        Outcome::NotFound
    } else {
        Outcome::MethodNotAllowed(allowed)
    }
}
