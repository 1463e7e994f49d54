//! Main router implementation.

use std::sync::Arc;

use tracing::debug;

use crate::builder::{BuildState, Scope};
use crate::config::RouterConfig;
use crate::dispatch::dispatch;
use crate::error::{DispatchError, Result};
use crate::matcher::{self, Outcome};
use crate::node::{Node, NodeBuilder};
use crate::request::{Method, Request};
use crate::response::Response;

/// One route answered by a router, as listed by [`Router::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: Method,
    /// Path pattern, with captures as `{name}`.
    pub path: String,
}

/// An immutable route tree ready to serve requests.
///
/// Cloning is cheap and clones share the tree, so a router can be handed to
/// any number of threads or tasks.
#[derive(Clone)]
pub struct Router {
    root: Arc<Node>,
    config: RouterConfig,
}

impl Router {
    /// Builds a router with the default configuration.
    ///
    /// Fails with the first structural error found while `define` ran.
    pub fn build<F>(define: F) -> Result<Self>
    where
        F: FnOnce(&mut Scope<'_>),
    {
        Self::build_with(RouterConfig::default(), define)
    }

    /// Builds a router with the given configuration.
    pub fn build_with<F>(config: RouterConfig, define: F) -> Result<Self>
    where
        F: FnOnce(&mut Scope<'_>),
    {
        let mut root = NodeBuilder::root();
        let mut state = BuildState::new(config.duplicate_handlers);
        define(&mut Scope::new(&mut root, &mut state));
        state.into_result()?;

        let router = Self {
            root: Arc::new(root.freeze()),
            config,
        };
        debug!(routes = router.routes().len(), "route tree built");
        Ok(router)
    }

    /// Returns the configuration in effect.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub(crate) fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Matches a method and path without running anything.
    pub fn find(&self, method: Method, path: &str) -> Outcome<'_> {
        matcher::find(&self.root, &self.config, method, path)
    }

    /// Matches and dispatches a request.
    ///
    /// Not-found and method-not-allowed outcomes are ordinary 404 and 405
    /// responses. A failing hook or handler yields a [`DispatchError`]
    /// carrying the response as it stood.
    pub fn handle(&self, mut request: Request) -> std::result::Result<Response, DispatchError> {
        let outcome = self.find(request.method, &request.path);
        let mut response = Response::ok();

        match dispatch(outcome, &mut request, &mut response) {
            Ok(()) => {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    "dispatched"
                );
                Ok(response)
            }
            Err(source) => {
                debug!(
                    method = %request.method,
                    path = %request.path,
                    error = %source,
                    "dispatch failed"
                );
                Err(DispatchError {
                    method: request.method,
                    path: request.path,
                    response,
                    source,
                })
            }
        }
    }

    /// Lists every route, sorted by path and then method.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes = Vec::new();
        collect_routes(&self.root, "", &mut routes);
        routes.sort_by(|a, b| a.path.cmp(&b.path).then(a.method.cmp(&b.method)));
        routes
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.routes())
            .finish()
    }
}

fn collect_routes(node: &Node, prefix: &str, out: &mut Vec<RouteInfo>) {
    let path = if prefix.is_empty() { "/" } else { prefix };
    out.extend(node.handlers.methods().map(|method| RouteInfo {
        method,
        path: path.to_string(),
    }));

    for (label, child) in &node.statics {
        collect_routes(child, &format!("{prefix}/{label}"), out);
    }
    if let Some(child) = &node.capture {
        let key = child.capture_key().unwrap_or_default();
        collect_routes(child, &format!("{prefix}/{{{key}}}"), out);
    }
    for mount in &node.mounts {
        collect_routes(mount, prefix, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildError;

    fn hello_world() -> Router {
        Router::build(|r| {
            r.get(|_, _| "root");
            r.route("hello", |r| {
                r.get(|_, _| "hello");
                r.route("world", |r| {
                    r.get(|_, _| "hello world");
                });
            });
        })
        .unwrap()
    }

    fn body(res: &Response) -> String {
        res.body_string().unwrap_or_default()
    }

    #[test]
    fn test_basic_routing() {
        let router = hello_world();

        let res = router.handle(Request::get("/")).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(body(&res), "root");

        let res = router.handle(Request::get("/hello")).unwrap();
        assert_eq!(body(&res), "hello");

        let res = router.handle(Request::get("/hello/world")).unwrap();
        assert_eq!(body(&res), "hello world");
    }

    #[test]
    fn test_not_found() {
        let router = hello_world();
        let res = router.handle(Request::get("/hello/fnord")).unwrap();
        assert_eq!(res.status, 404);
    }

    #[test]
    fn test_method_not_allowed() {
        let router = hello_world();
        let res = router.handle(Request::delete("/hello/world")).unwrap();
        assert_eq!(res.status, 405);
        assert_eq!(res.get_header("Allow"), Some("GET"));
    }

    #[test]
    fn test_empty_router_is_not_found() {
        let router = Router::build(|_| {}).unwrap();
        assert!(matches!(router.find(Method::Get, "/"), Outcome::NotFound));
        assert!(matches!(router.find(Method::Get, "/a/b"), Outcome::NotFound));
        assert!(router.routes().is_empty());
    }

    #[test]
    fn test_handler_error_is_returned() {
        let router = Router::build(|r| {
            r.before(|_, res| res.set_header("X-Seen", "yes"));
            r.post(|_, _| Err::<String, _>("invalid payload"));
        })
        .unwrap();

        let err = router.handle(Request::post("/")).unwrap_err();
        assert_eq!(err.method, Method::Post);
        assert_eq!(err.path, "/");
        assert_eq!(err.response.get_header("X-Seen"), Some("yes"));
        assert_eq!(err.source.to_string(), "invalid payload");
    }

    #[test]
    fn test_json_body_in_and_out() {
        let router = Router::build(|r| {
            r.before(|_, res| res.set_header("X-Seen", "yes"));
            r.route("echo", |r| {
                r.post(|req, res| -> std::result::Result<(), crate::HandlerError> {
                    let value: serde_json::Value = req.json()?;
                    res.apply(Response::json(&value).status(201));
                    Ok(())
                });
            });
        })
        .unwrap();

        let res = router
            .handle(Request::post("/echo").body(r#"{"a":1}"#))
            .unwrap();
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("X-Seen"), Some("yes"));
        assert_eq!(res.get_header("Content-Type"), Some("application/json"));
        assert_eq!(res.body_string(), Some(r#"{"a":1}"#.to_string()));

        let err = router
            .handle(Request::post("/echo").body("not json"))
            .unwrap_err();
        assert_eq!(err.response.status, 200);
    }

    #[test]
    fn test_build_error_is_reported() {
        let err = Router::build(|r| {
            r.route("{id}", |_| {});
            r.route("{name}", |_| {});
        })
        .unwrap_err();
        assert!(matches!(err, BuildError::AmbiguousCapture { .. }));
    }

    #[test]
    fn test_routes_listing() {
        let router = Router::build(|r| {
            r.get(|_, _| "root");
            r.route("users/{id}", |r| {
                r.get(|_, _| "user");
                r.delete(|_, _| "deleted");
            });
        })
        .unwrap();

        let routes: Vec<(Method, String)> = router
            .routes()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect();
        assert_eq!(
            routes,
            vec![
                (Method::Get, "/".to_string()),
                (Method::Get, "/users/{id}".to_string()),
                (Method::Delete, "/users/{id}".to_string()),
            ]
        );
    }
}
