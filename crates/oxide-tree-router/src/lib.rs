//! # oxide-tree-router
//!
//! A request router built from a tree of path segments.
//!
//! This crate provides:
//! - A nested builder for declaring routes segment by segment
//! - Static segments and `{name}` capture segments, with static winning
//! - Per-method handlers with automatic 404 and 405 answers
//! - Before-hooks that run ancestors first, in declaration order
//! - Mounting one built router inside another
//!
//! Matching and dispatch are synchronous and transport-agnostic: the crate
//! consumes a [`Request`] and produces a [`Response`]. Turning HTTP bytes into
//! those is left to an adapter (see the `hello_server` example).
//!
//! ## Quick Start
//!
//! ```
//! use oxide_tree_router::{Request, Router};
//!
//! let router = Router::build(|r| {
//!     r.get(|_, _| "root");
//!     r.route("users/{id}", |r| {
//!         r.get(|req, _| format!("user {}", req.param("id").unwrap_or("?")));
//!     });
//! })
//! .unwrap();
//!
//! let res = router.handle(Request::get("/users/42")).unwrap();
//! assert_eq!(res.status, 200);
//! assert_eq!(res.body_string(), Some("user 42".to_string()));
//! ```
//!
//! ## Before-hooks
//!
//! Hooks receive the live request and response. They can stash values in
//! [`Request::attributes`] for the handler, change the response, or stop
//! dispatch by returning [`Flow::Halt`]:
//!
//! ```
//! use oxide_tree_router::{Flow, Request, Router};
//!
//! let router = Router::build(|r| {
//!     r.route("admin", |r| {
//!         r.before(|req, res| {
//!             if req.get_header("Authorization").is_none() {
//!                 res.status = 401;
//!                 return Flow::Halt;
//!             }
//!             req.attributes.insert("user", "root".to_string());
//!             Flow::Continue
//!         });
//!         r.get(|req, _| {
//!             format!("hi {}", req.attributes.get::<String>("user").unwrap())
//!         });
//!     });
//! })
//! .unwrap();
//!
//! let res = router.handle(Request::get("/admin")).unwrap();
//! assert_eq!(res.status, 401);
//! ```
//!
//! ## Mounting
//!
//! ```
//! use oxide_tree_router::{Request, Router};
//!
//! let blog = Router::build(|r| {
//!     r.route("posts", |r| {
//!         r.get(|_, _| "all posts");
//!     });
//! })
//! .unwrap();
//!
//! let site = Router::build(|r| {
//!     r.route("blog", |r| {
//!         r.mount(&blog);
//!     });
//!     r.route("archive", |r| {
//!         r.mount(&blog);
//!     });
//! })
//! .unwrap();
//!
//! let res = site.handle(Request::get("/archive/posts")).unwrap();
//! assert_eq!(res.body_string(), Some("all posts".to_string()));
//! ```

mod builder;
mod config;
mod dispatch;
mod error;
mod handler;
mod matcher;
mod node;
mod request;
mod response;
mod router;
mod segment;

pub use builder::{IntoSegments, Scope};
pub use config::{DuplicateHandlers, RouterConfig, TrailingSlash};
pub use dispatch::dispatch;
pub use error::{BuildError, DispatchError, HandlerError, Result};
pub use handler::{Flow, IntoBody, IntoFlow};
pub use matcher::{Match, Outcome};
pub use request::{Attributes, Method, Params, Request};
pub use response::Response;
pub use router::{RouteInfo, Router};
pub use segment::Segment;
