//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_tree_router::{Method, Request, Response, Router};

/// Sends a request with no query, headers or body.
pub fn send(router: &Router, method: Method, path: &str) -> Response {
    router
        .handle(Request::new(method, path))
        .expect("dispatch should not fail")
}

/// Sends a GET and returns status and body text.
pub fn get(router: &Router, path: &str) -> (u16, String) {
    let res = send(router, Method::Get, path);
    (res.status, res.body_string().unwrap_or_default())
}

/// Records the order in which hooks and handlers run.
#[derive(Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}
