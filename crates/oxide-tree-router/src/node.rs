//! The route tree.
//!
//! A tree is declared through [`NodeBuilder`]s and frozen into [`Node`]s
//! once declaration is finished. Frozen nodes are never mutated again, which
//! is what lets a mounted router be shared by reference between several
//! mount points.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::BuildError;
use crate::handler::{Handler, Hook};
use crate::request::Method;
use crate::segment::Segment;

/// Handlers of one node, one slot per [`Method`].
#[derive(Default)]
pub(crate) struct MethodTable {
    slots: [Option<Handler>; Method::COUNT],
}

impl MethodTable {
    pub(crate) fn get(&self, method: Method) -> Option<&Handler> {
        self.slots[method.index()].as_ref()
    }

    pub(crate) fn contains(&self, method: Method) -> bool {
        self.slots[method.index()].is_some()
    }

    /// Stores a handler and returns the one it replaced.
    pub(crate) fn insert(&mut self, method: Method, handler: Handler) -> Option<Handler> {
        self.slots[method.index()].replace(handler)
    }

    pub(crate) fn methods(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.contains(*m))
    }
}

/// A frozen node of the route tree.
///
/// Lookups search the node's own children first and then each mounted root
/// in mount order. Build-time checks guarantee that at most one of them can
/// answer.
pub(crate) struct Node {
    /// `None` for a root.
    pub(crate) segment: Option<Segment>,
    pub(crate) handlers: MethodTable,
    /// Own hooks followed by the root hooks of mounted routers.
    pub(crate) hooks: Vec<Hook>,
    pub(crate) statics: HashMap<String, Arc<Node>>,
    pub(crate) capture: Option<Arc<Node>>,
    pub(crate) mounts: Vec<Arc<Node>>,
}

impl Node {
    /// Key bound by this node if it is a capture node.
    pub(crate) fn capture_key(&self) -> Option<&str> {
        match &self.segment {
            Some(Segment::Capture(key)) => Some(key),
            _ => None,
        }
    }

    /// Finds the static child labelled `label`.
    pub(crate) fn static_child(&self, label: &str) -> Option<&Node> {
        if let Some(child) = self.statics.get(label) {
            return Some(&**child);
        }
        self.mounts.iter().find_map(|mount| mount.static_child(label))
    }

    /// Finds the capture child.
    pub(crate) fn capture_child(&self) -> Option<&Node> {
        if let Some(child) = &self.capture {
            return Some(&**child);
        }
        self.mounts.iter().find_map(|mount| mount.capture_child())
    }

    /// Finds the handler for `method` on this node.
    pub(crate) fn handler(&self, method: Method) -> Option<&Handler> {
        if let Some(handler) = self.handlers.get(method) {
            return Some(handler);
        }
        self.mounts.iter().find_map(|mount| mount.handler(method))
    }

    /// Methods answered at this node, including mounted contributions.
    pub(crate) fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.methods().collect();
        for mount in &self.mounts {
            methods.extend(mount.allowed_methods());
        }
        methods.sort();
        methods.dedup();
        methods
    }

    pub(crate) fn provides_static(&self, label: &str) -> bool {
        self.statics.contains_key(label) || self.mounts.iter().any(|m| m.provides_static(label))
    }

    pub(crate) fn provided_capture(&self) -> Option<&str> {
        self.capture
            .as_deref()
            .and_then(Node::capture_key)
            .or_else(|| self.mounts.iter().find_map(|m| m.provided_capture()))
    }

    pub(crate) fn provides_handler(&self, method: Method) -> bool {
        self.handlers.contains(method) || self.mounts.iter().any(|m| m.provides_handler(method))
    }

    /// Returns true if any node in this subtree captures into `key`.
    pub(crate) fn binds_capture(&self, key: &str) -> bool {
        self.capture_key() == Some(key)
            || self.statics.values().any(|child| child.binds_capture(key))
            || self.capture.as_deref().is_some_and(|child| child.binds_capture(key))
            || self.mounts.iter().any(|mount| mount.binds_capture(key))
    }

    /// Static labels answered at this node, including mounted contributions.
    pub(crate) fn static_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.statics.keys().map(String::as_str).collect();
        for mount in &self.mounts {
            labels.extend(mount.static_labels());
        }
        labels
    }
}

/// A node that is still being declared.
pub(crate) struct NodeBuilder {
    segment: Option<Segment>,
    pub(crate) handlers: MethodTable,
    pub(crate) hooks: Vec<Hook>,
    statics: HashMap<String, NodeBuilder>,
    capture: Option<Box<NodeBuilder>>,
    mounts: Vec<Arc<Node>>,
}

impl NodeBuilder {
    pub(crate) fn root() -> Self {
        Self::with_segment(None)
    }

    fn with_segment(segment: Option<Segment>) -> Self {
        Self {
            segment,
            handlers: MethodTable::default(),
            hooks: Vec::new(),
            statics: HashMap::new(),
            capture: None,
            mounts: Vec::new(),
        }
    }

    /// Returns the child for `segment`, creating it if needed.
    ///
    /// `at` is the path of this node, used in error messages.
    pub(crate) fn child(&mut self, segment: &Segment, at: &str) -> Result<&mut Self, BuildError> {
        match segment {
            Segment::Static(label) => {
                if self.mounts.iter().any(|m| m.provides_static(label)) {
                    return Err(BuildError::MountConflict {
                        path: at.to_string(),
                        reason: format!("segment {label:?} is also provided by a mounted router"),
                    });
                }
                Ok(self
                    .statics
                    .entry(label.clone())
                    .or_insert_with(|| Self::with_segment(Some(segment.clone()))))
            }
            Segment::Capture(key) => {
                if let Some(mounted) = self.mounts.iter().find_map(|m| m.provided_capture()) {
                    return Err(BuildError::MountConflict {
                        path: at.to_string(),
                        reason: format!(
                            "capture {{{key}}} overlaps capture {{{mounted}}} of a mounted router"
                        ),
                    });
                }
                let child = self
                    .capture
                    .get_or_insert_with(|| Box::new(Self::with_segment(Some(segment.clone()))));
                let existing = match &child.segment {
                    Some(Segment::Capture(existing)) if existing != key => Some(existing.clone()),
                    _ => None,
                };
                if let Some(existing) = existing {
                    return Err(BuildError::AmbiguousCapture {
                        path: at.to_string(),
                        existing,
                        declared: key.clone(),
                    });
                }
                Ok(&mut **child)
            }
        }
    }

    /// Returns true if a mounted router already answers `method` here.
    pub(crate) fn mounted_handler(&self, method: Method) -> bool {
        self.mounts.iter().any(|m| m.provides_handler(method))
    }

    /// Splices a frozen root into this node.
    ///
    /// The root's hooks are appended to this node's hooks, after the ones
    /// declared so far. Any overlap with what this node already answers is
    /// rejected.
    pub(crate) fn mount(&mut self, root: &Arc<Node>, at: &str) -> Result<(), BuildError> {
        let conflict = |reason: String| BuildError::MountConflict {
            path: at.to_string(),
            reason,
        };

        for label in root.static_labels() {
            if self.statics.contains_key(label)
                || self.mounts.iter().any(|m| m.provides_static(label))
            {
                return Err(conflict(format!("segment {label:?} is declared on both sides")));
            }
        }

        if let Some(key) = root.provided_capture() {
            let local = self.capture.as_ref().and_then(|c| match &c.segment {
                Some(Segment::Capture(k)) => Some(k.as_str()),
                _ => None,
            });
            if let Some(existing) =
                local.or_else(|| self.mounts.iter().find_map(|m| m.provided_capture()))
            {
                return Err(conflict(format!(
                    "capture {{{key}}} overlaps existing capture {{{existing}}}"
                )));
            }
        }

        for method in root.allowed_methods() {
            if self.handlers.contains(method) || self.mounted_handler(method) {
                return Err(conflict(format!("{method} handler is declared on both sides")));
            }
        }

        self.hooks.extend(root.hooks.iter().cloned());
        self.mounts.push(Arc::clone(root));
        Ok(())
    }

    /// Freezes this subtree.
    pub(crate) fn freeze(self) -> Node {
        Node {
            segment: self.segment,
            handlers: self.handlers,
            hooks: self.hooks,
            statics: self
                .statics
                .into_iter()
                .map(|(label, child)| (label, Arc::new(child.freeze())))
                .collect(),
            capture: self.capture.map(|child| Arc::new(child.freeze())),
            mounts: self.mounts,
        }
    }
}
