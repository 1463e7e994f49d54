//! Error types for building and dispatching routes.

use thiserror::Error;

use crate::request::Method;
use crate::response::Response;

/// An error raised by a before-hook or a terminal handler.
///
/// Boxed so handlers can use `?` on any error type.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Structural errors detected while a route tree is being declared.
///
/// These are always reported by [`Router::build`](crate::Router::build),
/// never at request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two different capture segments were declared at the same level.
    #[error("ambiguous capture at {path}: {{{existing}}} already declared, got {{{declared}}}")]
    AmbiguousCapture {
        /// Path of the node holding the captures.
        path: String,
        /// Key of the capture declared first.
        existing: String,
        /// Key of the rejected capture.
        declared: String,
    },

    /// A capture key was declared below a capture that already binds it.
    #[error("repeated capture at {path}: {{{key}}} is already bound by an ancestor")]
    RepeatedCapture {
        /// Path of the node where the second capture was declared.
        path: String,
        /// The repeated key.
        key: String,
    },

    /// A handler was registered twice for one method on one node.
    #[error("duplicate {method} handler at {path}")]
    DuplicateHandler {
        /// The method registered twice.
        method: Method,
        /// Path of the node.
        path: String,
    },

    /// A mounted router overlaps with routes already present at the mount point.
    #[error("mount conflict at {path}: {reason}")]
    MountConflict {
        /// Path of the mount point.
        path: String,
        /// What overlapped.
        reason: String,
    },

    /// A route segment could not be parsed.
    #[error("invalid segment {segment:?} under {path}: {reason}")]
    InvalidSegment {
        /// Path of the parent node.
        path: String,
        /// The offending segment text.
        segment: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// A hook or handler failed while a request was being dispatched.
///
/// Carries whatever response the earlier hooks had built, so the transport
/// adapter can decide between answering with a 500 or propagating the fault.
#[derive(Debug, Error)]
#[error("{method} {path} failed: {source}")]
pub struct DispatchError {
    /// Method of the failed request.
    pub method: Method,
    /// Path of the failed request.
    pub path: String,
    /// The response as it stood when the fault occurred.
    pub response: Response,
    /// The underlying fault.
    #[source]
    pub source: HandlerError,
}

impl DispatchError {
    /// Discards the fault and answers with a 500 response.
    #[must_use]
    pub fn into_internal_server_error(self) -> Response {
        Response::internal_server_error()
    }
}

/// Result type alias for router construction.
pub type Result<T> = std::result::Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_messages() {
        let err = BuildError::AmbiguousCapture {
            path: "/users".to_string(),
            existing: "id".to_string(),
            declared: "name".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ambiguous capture at /users: {id} already declared, got {name}"
        );

        let err = BuildError::DuplicateHandler {
            method: Method::Get,
            path: "/".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate GET handler at /");
    }

    #[test]
    fn test_dispatch_error_keeps_source() {
        let err = DispatchError {
            method: Method::Post,
            path: "/items".to_string(),
            response: Response::ok(),
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "POST /items failed: boom");
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(err.into_internal_server_error().status, 500);
    }
}
