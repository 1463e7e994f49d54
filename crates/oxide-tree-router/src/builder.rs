//! The declarative surface for building route trees.

use tracing::{debug, warn};

use crate::config::DuplicateHandlers;
use crate::error::BuildError;
use crate::handler::{boxed_handler, boxed_hook, IntoBody, IntoFlow};
use crate::node::NodeBuilder;
use crate::request::{Method, Request};
use crate::response::Response;
use crate::router::Router;
use crate::segment::Segment;

/// Things [`Scope::route`] accepts as a route.
///
/// A string may hold several segments (`"api/v1/{id}"`); each one descends
/// a level. Empty components are skipped, so `""` and `"/"` mean the
/// current node.
pub trait IntoSegments {
    /// Splits into segments, or returns the offending text and the reason
    /// it was rejected.
    fn into_segments(self) -> Result<Vec<Segment>, (String, &'static str)>;
}

impl IntoSegments for &str {
    fn into_segments(self) -> Result<Vec<Segment>, (String, &'static str)> {
        self.split('/')
            .filter(|part| !part.is_empty())
            .map(|part| Segment::parse(part).map_err(|reason| (part.to_string(), reason)))
            .collect()
    }
}

impl IntoSegments for &String {
    fn into_segments(self) -> Result<Vec<Segment>, (String, &'static str)> {
        self.as_str().into_segments()
    }
}

impl IntoSegments for String {
    fn into_segments(self) -> Result<Vec<Segment>, (String, &'static str)> {
        self.as_str().into_segments()
    }
}

impl IntoSegments for Segment {
    fn into_segments(self) -> Result<Vec<Segment>, (String, &'static str)> {
        let text = self.to_string();
        self.validate()
            .map(|segment| vec![segment])
            .map_err(|reason| (text, reason))
    }
}

/// Build-wide state shared by every [`Scope`] of one build.
pub(crate) struct BuildState {
    duplicate_handlers: DuplicateHandlers,
    error: Option<BuildError>,
}

impl BuildState {
    pub(crate) fn new(duplicate_handlers: DuplicateHandlers) -> Self {
        Self {
            duplicate_handlers,
            error: None,
        }
    }

    /// Records an error. Only the first one is reported by the build.
    fn fail(&mut self, err: BuildError) {
        warn!(error = %err, "route declaration rejected");
        self.error.get_or_insert(err);
    }

    pub(crate) fn into_result(self) -> Result<(), BuildError> {
        self.error.map_or(Ok(()), Err)
    }
}

/// A cursor on one node of a route tree under construction.
///
/// Handed to the closures given to [`Router::build`] and [`Scope::route`].
/// Errors are recorded as they happen and reported by the build.
///
/// ```
/// use oxide_tree_router::Router;
///
/// let router = Router::build(|r| {
///     r.get(|_, _| "root");
///     r.route("hello", |r| {
///         r.get(|_, _| "hello");
///         r.route("world", |r| {
///             r.get(|_, _| "hello world");
///         });
///     });
/// })
/// .unwrap();
/// # let _ = router;
/// ```
pub struct Scope<'b> {
    node: &'b mut NodeBuilder,
    path: String,
    /// Capture keys bound on the way down to this node.
    captures: Vec<String>,
    state: &'b mut BuildState,
}

impl<'b> Scope<'b> {
    pub(crate) fn new(node: &'b mut NodeBuilder, state: &'b mut BuildState) -> Self {
        Self {
            node,
            path: "/".to_string(),
            captures: Vec::new(),
            state,
        }
    }

    /// Path of the node this scope points at, with captures as `{name}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Enters (creating if needed) the node for `path` and runs `define` on it.
    ///
    /// Declaring the same literal twice at one level reuses the node.
    pub fn route<S, F>(&mut self, path: S, define: F) -> &mut Self
    where
        S: IntoSegments,
        F: FnOnce(&mut Scope<'_>),
    {
        match path.into_segments() {
            Ok(segments) => self.descend(&segments, define),
            Err((segment, reason)) => self.state.fail(BuildError::InvalidSegment {
                path: self.path.clone(),
                segment,
                reason,
            }),
        }
        self
    }

    /// Enters the capture child bound to `key`.
    pub fn capture<F>(&mut self, key: &str, define: F) -> &mut Self
    where
        F: FnOnce(&mut Scope<'_>),
    {
        self.route(Segment::capture(key), define)
    }

    fn descend<F>(&mut self, segments: &[Segment], define: F)
    where
        F: FnOnce(&mut Scope<'_>),
    {
        let Some((first, rest)) = segments.split_first() else {
            define(self);
            return;
        };

        let mut captures = self.captures.clone();
        if let Segment::Capture(key) = first {
            if captures.contains(key) {
                self.state.fail(BuildError::RepeatedCapture {
                    path: self.path.clone(),
                    key: key.clone(),
                });
                return;
            }
            captures.push(key.clone());
        }

        match self.node.child(first, &self.path) {
            Ok(child) => {
                let mut scope = Scope {
                    node: child,
                    path: join(&self.path, first),
                    captures,
                    state: &mut *self.state,
                };
                scope.descend(rest, define);
            }
            Err(err) => self.state.fail(err),
        }
    }

    /// Registers the handler for `method` on this node.
    pub fn on<F, R>(&mut self, method: Method, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        if self.node.mounted_handler(method) {
            self.state.fail(BuildError::MountConflict {
                path: self.path.clone(),
                reason: format!("{method} handler is also provided by a mounted router"),
            });
            return self;
        }

        if self.node.handlers.contains(method) {
            match self.state.duplicate_handlers {
                DuplicateHandlers::Reject => {
                    self.state.fail(BuildError::DuplicateHandler {
                        method,
                        path: self.path.clone(),
                    });
                    return self;
                }
                DuplicateHandlers::Replace => {
                    warn!(%method, path = %self.path, "replacing previously registered handler");
                }
            }
        }

        self.node.handlers.insert(method, boxed_handler(handler));
        self
    }

    /// Registers a GET handler.
    pub fn get<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Get, handler)
    }

    /// Registers a POST handler.
    pub fn post<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Post, handler)
    }

    /// Registers a PUT handler.
    pub fn put<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Put, handler)
    }

    /// Registers a PATCH handler.
    pub fn patch<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Patch, handler)
    }

    /// Registers a DELETE handler.
    pub fn delete<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Delete, handler)
    }

    /// Registers a HEAD handler.
    pub fn head<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Head, handler)
    }

    /// Registers an OPTIONS handler.
    pub fn options<F, R>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoBody,
    {
        self.on(Method::Options, handler)
    }

    /// Appends a before-hook to this node.
    ///
    /// Hooks run for every request resolved at or below this node, after the
    /// hooks of its ancestors and after hooks declared earlier on this node.
    pub fn before<F, R>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Request, &mut Response) -> R + Send + Sync + 'static,
        R: IntoFlow,
    {
        self.node.hooks.push(boxed_hook(hook));
        self
    }

    /// Splices a built router into this node.
    ///
    /// The router's routes become reachable below this node's path without
    /// an extra segment, and its root hooks join this node's hooks as if
    /// declared here at this point. The router is shared, not copied, so it
    /// can be mounted in several places.
    pub fn mount(&mut self, router: &Router) -> &mut Self {
        let root = router.root();
        if let Some(key) = self.captures.iter().find(|key| root.binds_capture(key)) {
            self.state.fail(BuildError::RepeatedCapture {
                path: self.path.clone(),
                key: key.clone(),
            });
            return self;
        }

        match self.node.mount(root, &self.path) {
            Ok(()) => debug!(path = %self.path, "mounted router"),
            Err(err) => self.state.fail(err),
        }
        self
    }
}

fn join(parent: &str, segment: &Segment) -> String {
    if parent.ends_with('/') {
        format!("{parent}{segment}")
    } else {
        format!("{parent}/{segment}")
    }
}
